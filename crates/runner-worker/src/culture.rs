// Selects the job's culture from its variables and applies it as the process
// default. There is no fallback culture.

use runner_common::constants::variables::system::CULTURE;
use runner_common::HostContext;

use crate::error::WorkerError;
use crate::job_message::JobRequestMessage;

/// Resolve `system.culture` from the job variables and apply it to `host_context`.
pub fn select_culture(message: &JobRequestMessage, host_context: &HostContext) -> Result<String, WorkerError> {
    let environment = message
        .environment
        .as_ref()
        .ok_or(WorkerError::MissingEnvironment)?;
    let variables = environment
        .variables
        .as_ref()
        .ok_or(WorkerError::MissingVariables)?;

    let culture = variables
        .get(CULTURE)
        .filter(|culture| !culture.is_empty())
        .ok_or_else(|| WorkerError::MissingCulture(CULTURE.to_string()))?;

    host_context.set_default_culture(culture);
    Ok(culture.clone())
}
