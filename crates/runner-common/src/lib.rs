// runner-common: Shared services for the runner worker.
// Depends on `runner-sdk`.

pub mod constants;
pub mod host_context;
pub mod process_channel;
pub mod secret_masker;
pub mod tracing;
pub mod util;

// ---------------------------------------------------------------------------
// Re-exports for convenient access
// ---------------------------------------------------------------------------

pub use host_context::HostContext;
pub use process_channel::{ChannelError, MessageType, ProcessChannel, WorkerMessage};
pub use secret_masker::{SecretMasker, SecretMaskerError};
pub use self::tracing::{TraceEventType, TraceManager, TraceSetting, Tracing};
pub use util::task_result_util::{TaskResult, TaskResultUtil};
