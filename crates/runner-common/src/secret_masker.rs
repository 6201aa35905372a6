// SecretMasker: the worker's redaction engine.
// Thread-safe store of literal secrets and secret patterns; replaces every
// occurrence in output strings with `***`.

use parking_lot::RwLock;
use regex::Regex;
use std::ops::Range;
use std::sync::Arc;

/// Replacement text used when a secret is found.
const MASK: &str = "***";

#[derive(Debug, thiserror::Error)]
pub enum SecretMaskerError {
    #[error("invalid secret pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A thread-safe secret masker. Cloning yields another handle to the same rules.
///
/// The worker installs rules once during startup; trace sources and the job
/// engine only read them afterwards.
#[derive(Debug, Clone, Default)]
pub struct SecretMasker {
    inner: Arc<RwLock<SecretMaskerInner>>,
}

#[derive(Debug, Default)]
struct SecretMaskerInner {
    values: Vec<String>,
    regexes: Vec<Regex>,
}

impl SecretMasker {
    /// Create a new empty `SecretMasker`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a literal secret. Empty values and duplicates are ignored.
    pub fn add_value(&self, secret: &str) {
        if secret.is_empty() {
            return;
        }

        let mut inner = self.inner.write();
        if !inner.values.iter().any(|s| s == secret) {
            inner.values.push(secret.to_string());
        }
    }

    /// Register a secret pattern. Duplicate patterns are ignored.
    pub fn add_regex(&self, pattern: &str) -> Result<(), SecretMaskerError> {
        if pattern.is_empty() {
            return Ok(());
        }

        let regex = Regex::new(pattern).map_err(|source| SecretMaskerError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut inner = self.inner.write();
        if !inner.regexes.iter().any(|r| r.as_str() == pattern) {
            inner.regexes.push(regex);
        }
        Ok(())
    }

    /// Replace every registered secret in `input` with `***`.
    ///
    /// Match ranges from all rules are collected first and overlapping or
    /// touching ranges are merged, so a secret that contains another secret is
    /// masked as a whole.
    pub fn mask_secrets(&self, input: &str) -> String {
        let inner = self.inner.read();
        if input.is_empty() || (inner.values.is_empty() && inner.regexes.is_empty()) {
            return input.to_string();
        }

        let mut ranges: Vec<Range<usize>> = Vec::new();
        for value in &inner.values {
            ranges.extend(
                input
                    .match_indices(value.as_str())
                    .map(|(start, m)| start..start + m.len()),
            );
        }
        for regex in &inner.regexes {
            ranges.extend(
                regex
                    .find_iter(input)
                    .filter(|m| m.start() != m.end())
                    .map(|m| m.range()),
            );
        }

        if ranges.is_empty() {
            return input.to_string();
        }

        ranges.sort_by_key(|r| r.start);
        let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
                _ => merged.push(range),
            }
        }

        let mut result = String::with_capacity(input.len());
        let mut cursor = 0;
        for range in merged {
            result.push_str(&input[cursor..range.start]);
            result.push_str(MASK);
            cursor = range.end;
        }
        result.push_str(&input[cursor..]);
        result
    }

    /// Number of registered literal secrets.
    pub fn value_count(&self) -> usize {
        self.inner.read().values.len()
    }

    /// Number of registered secret patterns.
    pub fn regex_count(&self) -> usize {
        self.inner.read().regexes.len()
    }

    /// Whether `value` is registered as a literal secret.
    pub fn contains_value(&self, value: &str) -> bool {
        self.inner.read().values.iter().any(|s| s == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_single_secret() {
        let masker = SecretMasker::new();
        masker.add_value("password123");
        assert_eq!(masker.mask_secrets("my password123 is here"), "my *** is here");
    }

    #[test]
    fn test_mask_multiple_secrets() {
        let masker = SecretMasker::new();
        masker.add_value("secret1");
        masker.add_value("secret2");
        assert_eq!(
            masker.mask_secrets("secret1 and secret2 values"),
            "*** and *** values"
        );
    }

    #[test]
    fn test_mask_overlapping_secrets() {
        let masker = SecretMasker::new();
        masker.add_value("pass");
        masker.add_value("password");
        assert_eq!(masker.mask_secrets("my password is here"), "my *** is here");
    }

    #[test]
    fn test_adjacent_matches_merge() {
        let masker = SecretMasker::new();
        masker.add_value("abc");
        masker.add_value("def");
        assert_eq!(masker.mask_secrets("xabcdefx"), "x***x");
    }

    #[test]
    fn test_regex_rule() {
        let masker = SecretMasker::new();
        masker.add_regex("tok_[0-9a-f]{4}").unwrap();
        assert_eq!(
            masker.mask_secrets("auth tok_12ab then tok_ffff"),
            "auth *** then ***"
        );
        assert_eq!(masker.regex_count(), 1);
    }

    #[test]
    fn test_regex_and_literal_overlap() {
        let masker = SecretMasker::new();
        masker.add_value("key=");
        masker.add_regex("=[a-z]+").unwrap();
        assert_eq!(masker.mask_secrets("key=hunter done"), "*** done");
    }

    #[test]
    fn test_invalid_regex_is_error() {
        let masker = SecretMasker::new();
        let err = masker.add_regex("(unclosed").unwrap_err();
        assert!(err.to_string().contains("(unclosed"));
        assert_eq!(masker.regex_count(), 0);
    }

    #[test]
    fn test_empty_and_duplicate_values_consolidated() {
        let masker = SecretMasker::new();
        masker.add_value("");
        masker.add_value("dup");
        masker.add_value("dup");
        masker.add_regex("x+").unwrap();
        masker.add_regex("x+").unwrap();
        assert_eq!(masker.value_count(), 1);
        assert_eq!(masker.regex_count(), 1);
    }

    #[test]
    fn test_whitespace_secret_kept_verbatim() {
        let masker = SecretMasker::new();
        masker.add_value("a b");
        assert!(masker.contains_value("a b"));
        assert_eq!(masker.mask_secrets("[a b]"), "[***]");
    }

    #[test]
    fn test_clones_share_rules() {
        let masker = SecretMasker::new();
        let reader = masker.clone();
        masker.add_value("shared");
        assert_eq!(reader.mask_secrets("shared!"), "***!");
    }

    #[test]
    fn test_no_secrets_passthrough() {
        let masker = SecretMasker::new();
        assert_eq!(masker.mask_secrets("hello world"), "hello world");
    }
}
