// Worker: receives the job message over IPC, installs secret masks, selects the culture,
// starts the job and races its completion against a cancel message.

use runner_common::constants::WORKER_START_TIMEOUT;
use runner_common::{HostContext, MessageType, ProcessChannel, TaskResult, TaskResultUtil, Tracing};
use runner_sdk::{ArgUtil, TraceWriter};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use crate::culture::select_culture;
use crate::error::WorkerError;
use crate::job_message::JobRequestMessage;
use crate::job_runner::{JobContext, JobRunner};
use crate::secret_registrar::install_masking_rules;

/// The worker service – top level orchestration for one job.
pub struct Worker {
    host_context: Arc<HostContext>,
    job_runner: Arc<dyn JobRunner>,
    start_timeout: Duration,
}

impl Worker {
    /// Create a new `Worker` that executes jobs with `job_runner`.
    pub fn new(host_context: Arc<HostContext>, job_runner: Arc<dyn JobRunner>) -> Self {
        Self {
            host_context,
            job_runner,
            start_timeout: WORKER_START_TIMEOUT,
        }
    }

    /// Override how long to wait for the job message.
    pub fn with_start_timeout(mut self, start_timeout: Duration) -> Self {
        self.start_timeout = start_timeout;
        self
    }

    /// Main entry point. Returns the process exit code translated from the
    /// job's final `TaskResult`.
    ///
    /// `host_token` is only ever cancelled here, after a valid `CancelRequest`
    /// arrives; the job is then awaited to completion and its real result is
    /// reported. Any error returned means the job result could not be obtained.
    /// The channel is closed on every path.
    pub async fn run_async(
        &self,
        pipe_in: &str,
        pipe_out: &str,
        host_token: CancellationToken,
    ) -> Result<i32, WorkerError> {
        ArgUtil::not_null_or_empty(pipe_in, "pipe_in")?;
        ArgUtil::not_null_or_empty(pipe_out, "pipe_out")?;

        let trace = self.host_context.get_trace("Worker");
        trace.entering("Worker::run_async");
        let mut channel = ProcessChannel::new();
        let result = self
            .run_with_channel(&mut channel, pipe_in, pipe_out, host_token, &trace)
            .await;
        channel.close();

        if let Err(ref e) = result {
            trace.error_err(e);
        }
        result
    }

    async fn run_with_channel(
        &self,
        channel: &mut ProcessChannel,
        pipe_in: &str,
        pipe_out: &str,
        host_token: CancellationToken,
        trace: &Tracing,
    ) -> Result<i32, WorkerError> {
        channel.start_client(pipe_in, pipe_out).await?;

        trace.info("Waiting to receive the job message from the channel.");
        let message = tokio::time::timeout(
            self.start_timeout,
            channel.receive_async(&CancellationToken::new()),
        )
        .await
        .map_err(|_| WorkerError::StartupTimeout(self.start_timeout))??;

        trace.info("Message received.");
        if message.message_type != MessageType::NewJobRequest {
            return Err(WorkerError::UnexpectedMessage {
                expected: MessageType::NewJobRequest,
                actual: message.message_type,
            });
        }
        if message.body.is_empty() {
            return Err(WorkerError::EmptyMessageBody);
        }
        let job: JobRequestMessage = serde_json::from_str::<Option<JobRequestMessage>>(&message.body)
            .map_err(WorkerError::InvalidJobMessage)?
            .ok_or(WorkerError::NullJobMessage)?;

        // Masks go in first: everything traced from here on is redacted.
        install_masking_rules(&job, &self.host_context.secret_masker, trace)?;
        let culture = select_culture(&job, &self.host_context)?;

        trace.verbose(&format!("JobMessage: {}", message.body));
        let context = JobContext {
            host_context: Arc::clone(&self.host_context),
            cancel_token: host_token.clone(),
            culture,
        };
        let job_runner = Arc::clone(&self.job_runner);
        let mut job_task = tokio::spawn(async move { job_runner.run_async(job, context).await });

        trace.info("Listening for cancel message from the channel.");
        let channel_token = CancellationToken::new();
        let cancel_receive = channel.receive_async(&channel_token);
        tokio::pin!(cancel_receive);

        trace.info("Waiting for the job to complete or for a cancel message from the channel.");
        tokio::select! {
            biased;

            outcome = &mut job_task => {
                trace.info("Job completed.");
                channel_token.cancel();
                Ok(Self::translate(outcome, trace))
            }

            received = &mut cancel_receive => {
                trace.info("Cancellation message received.");
                let message = received?;
                if message.message_type != MessageType::CancelRequest {
                    return Err(WorkerError::UnexpectedMessage {
                        expected: MessageType::CancelRequest,
                        actual: message.message_type,
                    });
                }

                host_token.cancel();
                trace.info("Waiting for the job to finish after cancellation.");
                Ok(Self::translate(job_task.await, trace))
            }
        }
    }

    fn translate(outcome: Result<TaskResult, JoinError>, trace: &Tracing) -> i32 {
        let result = outcome.unwrap_or_else(|e| {
            trace.error(&format!("Job runner task failed: {}", e));
            TaskResult::Failed
        });
        let return_code = TaskResultUtil::translate_to_return_code(result);
        trace.info(&format!(
            "Job result {} translated to return code {}.",
            result, return_code
        ));
        return_code
    }
}
