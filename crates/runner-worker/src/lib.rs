// runner-worker: the single-job worker process.
// Depends on `runner-sdk` and `runner-common`.
//
// Architecture:
//   Worker::run_async
//     → secret_registrar::install_masking_rules
//     → culture::select_culture
//     → JobRunner::run_async (ScriptJobRunner by default) raced against a cancel message

pub mod culture;
pub mod error;
pub mod job_message;
pub mod job_runner;
pub mod secret_registrar;
pub mod steps_runner;
pub mod worker;

pub use error::WorkerError;
pub use job_message::JobRequestMessage;
pub use job_runner::{JobContext, JobRunner};
pub use steps_runner::ScriptJobRunner;
pub use worker::Worker;
