// The job execution seam. The worker hands a validated job to a `JobRunner`
// and only ever observes the `TaskResult` it eventually returns.

use async_trait::async_trait;
use runner_common::{HostContext, TaskResult};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::job_message::JobRequestMessage;

/// Execution context handed to the job engine.
#[derive(Clone)]
pub struct JobContext {
    /// Shared services; its secret masker already holds the job's rules.
    pub host_context: Arc<HostContext>,
    /// The host cancellation token. The worker cancels it when the listener
    /// asks for cancellation; the engine should then wind down and return.
    pub cancel_token: CancellationToken,
    /// Culture selected for this job.
    pub culture: String,
}

/// Executes one job to completion.
///
/// Implementations report failure and cancellation through the returned
/// `TaskResult`, never by panicking.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run_async(&self, message: JobRequestMessage, context: JobContext) -> TaskResult;
}
