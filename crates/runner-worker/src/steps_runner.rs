// Default job engine: runs each step's script through the shell, streams its
// output through the secret masker and merges step results into the job result.

use async_trait::async_trait;
use runner_common::{SecretMasker, TaskResult, TaskResultUtil};
use runner_sdk::TraceWriter;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::job_message::{JobRequestMessage, JobStep};
use crate::job_runner::{JobContext, JobRunner};

/// How long a cancelled step gets to exit after SIGINT before it is killed.
const DEFAULT_CANCEL_GRACE: Duration = Duration::from_millis(7500);

/// How a step's process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepExit {
    Code(i32),
    Cancelled,
}

/// Runs `JobRequestMessage::steps` as shell scripts, one after another.
pub struct ScriptJobRunner {
    shell: String,
    cancel_grace: Duration,
}

impl Default for ScriptJobRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptJobRunner {
    pub fn new() -> Self {
        Self {
            shell: "sh".to_string(),
            cancel_grace: DEFAULT_CANCEL_GRACE,
        }
    }

    pub fn with_cancel_grace(mut self, cancel_grace: Duration) -> Self {
        self.cancel_grace = cancel_grace;
        self
    }

    /// Run `steps` in order and return the merged job result.
    ///
    /// A failed step stops the job unless it is `continue_on_error`, in which
    /// case it counts as `SucceededWithIssues`. Once `cancel_token` fires the
    /// running step is interrupted and no further step starts.
    pub async fn run_steps(
        &self,
        steps: &[JobStep],
        masker: &SecretMasker,
        cancel_token: &CancellationToken,
        output: &dyn TraceWriter,
    ) -> TaskResult {
        let mut job_result: Option<TaskResult> = None;

        for (index, step) in steps.iter().enumerate() {
            let name = if step.display_name.is_empty() {
                format!("Step {}", index + 1)
            } else {
                step.display_name.clone()
            };

            if cancel_token.is_cancelled() {
                output.info(&format!("Skipping '{}': the job was cancelled.", name));
                job_result = Some(TaskResultUtil::merge_task_results(job_result, TaskResult::Canceled));
                break;
            }

            output.info(&format!("Starting: {}", name));
            let step_result = match self.run_script(&step.script, masker, cancel_token, output).await {
                Ok(StepExit::Code(0)) => TaskResult::Succeeded,
                Ok(StepExit::Code(code)) => {
                    output.error(&format!("Process completed with exit code {}.", code));
                    failed_result(step)
                }
                Ok(StepExit::Cancelled) => TaskResult::Canceled,
                Err(e) => {
                    output.error(&format!("Failed to run '{}': {}", name, e));
                    failed_result(step)
                }
            };
            output.info(&format!("Finished: {} ({})", name, step_result));

            job_result = Some(TaskResultUtil::merge_task_results(job_result, step_result));
            if matches!(step_result, TaskResult::Failed | TaskResult::Canceled) {
                break;
            }
        }

        job_result.unwrap_or(TaskResult::Succeeded)
    }

    async fn run_script(
        &self,
        script: &str,
        masker: &SecretMasker,
        cancel_token: &CancellationToken,
        output: &dyn TraceWriter,
    ) -> std::io::Result<StepExit> {
        let mut command = Command::new(&self.shell);
        command
            .arg("-e")
            .arg("-c")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group so cancellation reaches the script's children too.
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn()?;

        let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(forward_lines(stdout, line_tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(forward_lines(stderr, line_tx.clone()));
        }
        drop(line_tx);

        let exit = loop {
            tokio::select! {
                Some(line) = line_rx.recv() => output.info(&masker.mask_secrets(&line)),
                status = child.wait() => break StepExit::Code(status?.code().unwrap_or(-1)),
                _ = cancel_token.cancelled() => {
                    output.info("Cancellation requested; stopping the step.");
                    self.interrupt(&mut child).await;
                    break StepExit::Cancelled;
                }
            }
        };

        for reader in readers {
            let _ = reader.await;
        }
        while let Some(line) = line_rx.recv().await {
            output.info(&masker.mask_secrets(&line));
        }

        Ok(exit)
    }

    /// SIGINT the step's process group, then kill it if it outlives the grace period.
    async fn interrupt(&self, child: &mut Child) {
        #[cfg(unix)]
        if let Some(pid) = child.id() {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            let group = Pid::from_raw(pid as i32);
            if killpg(group, Signal::SIGINT).is_ok()
                && tokio::time::timeout(self.cancel_grace, child.wait()).await.is_ok()
            {
                return;
            }
            let _ = killpg(group, Signal::SIGKILL);
        }

        let _ = child.kill().await;
    }
}

fn failed_result(step: &JobStep) -> TaskResult {
    if step.continue_on_error {
        TaskResult::SucceededWithIssues
    } else {
        TaskResult::Failed
    }
}

fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
    })
}

#[async_trait]
impl JobRunner for ScriptJobRunner {
    async fn run_async(&self, message: JobRequestMessage, context: JobContext) -> TaskResult {
        let trace = context.host_context.get_trace("JobRunner");
        trace.info(&format!(
            "Starting job '{}' ({}) with {} step(s), culture '{}'.",
            message.job_name,
            message.job_id,
            message.steps.len(),
            context.culture
        ));

        let output = context.host_context.get_trace("Step");
        let result = self
            .run_steps(
                &message.steps,
                &context.host_context.secret_masker,
                &context.cancel_token,
                &output,
            )
            .await;

        trace.info(&format!("Job completed with result: {}", result));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runner_sdk::{CollectingTraceWriter, TraceLevel};

    fn step(name: &str, script: &str) -> JobStep {
        JobStep {
            display_name: name.to_string(),
            script: script.to_string(),
            continue_on_error: false,
        }
    }

    #[tokio::test]
    async fn test_no_steps_succeeds() {
        let runner = ScriptJobRunner::new();
        let output = CollectingTraceWriter::new();
        let result = runner
            .run_steps(&[], &SecretMasker::new(), &CancellationToken::new(), &output)
            .await;
        assert_eq!(result, TaskResult::Succeeded);
        assert!(output.messages().is_empty());
    }

    #[tokio::test]
    async fn test_output_is_masked() {
        let masker = SecretMasker::new();
        masker.add_value("hunter2");
        let output = CollectingTraceWriter::new();

        let result = ScriptJobRunner::new()
            .run_steps(
                &[step("print", "echo token=hunter2; echo oops >&2")],
                &masker,
                &CancellationToken::new(),
                &output,
            )
            .await;

        assert_eq!(result, TaskResult::Succeeded);
        assert!(output.contains(TraceLevel::Info, "token=***"));
        assert!(output.contains(TraceLevel::Info, "oops"));
        assert!(!output.messages().iter().any(|(_, m)| m.contains("hunter2")));
    }

    #[tokio::test]
    async fn test_failed_step_stops_job() {
        let output = CollectingTraceWriter::new();
        let result = ScriptJobRunner::new()
            .run_steps(
                &[step("fail", "exit 3"), step("after", "echo never-printed")],
                &SecretMasker::new(),
                &CancellationToken::new(),
                &output,
            )
            .await;

        assert_eq!(result, TaskResult::Failed);
        assert!(output.contains(TraceLevel::Error, "exit code 3"));
        assert!(!output.contains(TraceLevel::Info, "never-printed"));
    }

    #[tokio::test]
    async fn test_continue_on_error() {
        let mut flaky = step("flaky", "false");
        flaky.continue_on_error = true;
        let output = CollectingTraceWriter::new();

        let result = ScriptJobRunner::new()
            .run_steps(
                &[flaky, step("next", "echo still-running")],
                &SecretMasker::new(),
                &CancellationToken::new(),
                &output,
            )
            .await;

        assert_eq!(result, TaskResult::SucceededWithIssues);
        assert!(output.contains(TraceLevel::Info, "still-running"));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_running_step() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let output = CollectingTraceWriter::new();
        let started = std::time::Instant::now();
        let result = ScriptJobRunner::new()
            .with_cancel_grace(Duration::from_millis(500))
            .run_steps(
                &[step("sleepy", "sleep 30"), step("after", "echo never-printed")],
                &SecretMasker::new(),
                &token,
                &output,
            )
            .await;

        assert_eq!(result, TaskResult::Canceled);
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(!output.contains(TraceLevel::Info, "never-printed"));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_runs_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        let output = CollectingTraceWriter::new();

        let result = ScriptJobRunner::new()
            .run_steps(
                &[step("first", "echo never-printed")],
                &SecretMasker::new(),
                &token,
                &output,
            )
            .await;

        assert_eq!(result, TaskResult::Canceled);
        assert!(output.contains(TraceLevel::Info, "Skipping 'first'"));
        assert!(!output.contains(TraceLevel::Info, "never-printed"));
    }
}
