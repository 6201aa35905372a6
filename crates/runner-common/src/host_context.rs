// HostContext: process-wide services shared by the worker's components: the secret masker,
// trace sources and the default culture selected for the job.

use crate::constants;
use crate::secret_masker::SecretMasker;
use crate::tracing::{TraceManager, TraceSetting, Tracing};

use parking_lot::RwLock;
use runner_sdk::{StringUtil, TraceWriter};
use std::env;
use std::sync::Arc;

/// Shared application context for one worker process.
///
/// Created once in `main` and handed around as `Arc<HostContext>`. The secret
/// masker inside is the same instance every trace source masks with.
pub struct HostContext {
    /// The host type string (e.g. "Worker").
    host_type: String,

    /// Secret masker shared across the entire process.
    pub secret_masker: SecretMasker,

    trace_manager: TraceManager,

    /// Culture identifier applied by `set_default_culture`.
    default_culture: RwLock<Option<String>>,
}

impl HostContext {
    /// Create a new `HostContext`, reading trace settings from the environment.
    pub fn new(host_type: impl Into<String>) -> Arc<Self> {
        let print_to_stdout = env::var(constants::variables::agent::PRINT_LOG_TO_STDOUT)
            .ok()
            .and_then(|v| StringUtil::convert_to_bool(&v))
            .unwrap_or(false);

        Self::with_setting(
            host_type,
            TraceSetting {
                print_to_stdout,
                ..TraceSetting::default()
            },
        )
    }

    /// Create a new `HostContext` with explicit trace settings.
    pub fn with_setting(host_type: impl Into<String>, trace_setting: TraceSetting) -> Arc<Self> {
        let secret_masker = SecretMasker::new();
        let trace_manager = TraceManager::with_setting(secret_masker.clone(), trace_setting);

        Arc::new(Self {
            host_type: host_type.into(),
            secret_masker,
            trace_manager,
            default_culture: RwLock::new(None),
        })
    }

    /// Get a trace source for the given component name.
    pub fn get_trace(&self, name: &str) -> Tracing {
        self.trace_manager.get(name)
    }

    pub fn host_type(&self) -> &str {
        &self.host_type
    }

    /// Apply `culture` as the default culture for the rest of the process.
    pub fn set_default_culture(&self, culture: &str) {
        self.get_trace("HostContext")
            .info(&format!("Setting default culture to '{}'.", culture));
        *self.default_culture.write() = Some(culture.to_string());
    }

    /// The culture applied by `set_default_culture`, if any.
    pub fn default_culture(&self) -> Option<String> {
        self.default_culture.read().clone()
    }
}
