// Installs secret-masking rules derived from the job message. Runs before the
// culture is selected and before the job starts, so every later trace line
// is already redacted.

use indexmap::IndexMap;
use runner_common::SecretMasker;
use runner_sdk::{TraceWriter, UrlUtil};

use crate::error::WorkerError;
use crate::job_message::{JobRequestMessage, MaskType};

/// Register mask hints and endpoint authorization values with `masker`.
///
/// Missing optional data (no environment, no hints, no endpoints, an
/// unresolvable variable hint) installs nothing and is not an error. Only a
/// regex hint that fails to compile is rejected.
pub fn install_masking_rules(
    message: &JobRequestMessage,
    masker: &SecretMasker,
    trace: &dyn TraceWriter,
) -> Result<(), WorkerError> {
    let Some(environment) = message.environment.as_ref() else {
        return Ok(());
    };

    let no_variables = IndexMap::new();
    let variables = message.variables().unwrap_or(&no_variables);

    for hint in environment.mask_hints.iter().flatten() {
        match hint.mask_type {
            MaskType::Regex => masker.add_regex(&hint.value)?,
            MaskType::Variable => match variables.get(&hint.value).filter(|v| !v.is_empty()) {
                Some(value) => add_secret(masker, value),
                None => trace.verbose(&format!(
                    "Mask hint variable '{}' is not set; nothing to mask.",
                    hint.value
                )),
            },
        }
    }

    for endpoint in environment.endpoints.iter().flatten() {
        let parameters = endpoint
            .authorization
            .as_ref()
            .and_then(|auth| auth.parameters.as_ref());

        for value in parameters.into_iter().flat_map(|p| p.values()) {
            add_secret(masker, value);

            // Secrets also show up URL-encoded in transport logs.
            let escaped = UrlUtil::escape_data_string(value);
            if !escaped.eq_ignore_ascii_case(value) {
                masker.add_value(&escaped);
            }
        }
    }

    Ok(())
}

/// Register `value` and, when it differs, the form it takes inside a JSON
/// string literal. The job body itself is traced, so a secret containing `"`,
/// `\` or a control character must be masked in its escaped form too.
fn add_secret(masker: &SecretMasker, value: &str) {
    masker.add_value(value);

    if let Some(escaped) = json_escaped(value) {
        masker.add_value(&escaped);
    }
}

fn json_escaped(value: &str) -> Option<String> {
    let quoted = serde_json::to_string(value).ok()?;
    let escaped = quoted.strip_prefix('"')?.strip_suffix('"')?;
    (escaped != value).then(|| escaped.to_string())
}
