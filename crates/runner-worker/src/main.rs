// Entry point for the runner worker process.
//
// The worker is spawned by the listener with `--pipeIn <path> --pipeOut <path>`.
// It receives one job message over IPC, runs it, and exits with a return code
// that encodes the job's `TaskResult`.

use anyhow::Context;
use clap::Parser;
use runner_common::constants::return_code;
use runner_common::HostContext;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use runner_worker::{ScriptJobRunner, Worker};

/// Command-line arguments for the worker process.
#[derive(Parser, Debug)]
#[command(name = "Runner.Worker", about = "Runner worker: executes a single job")]
struct Args {
    /// Path to the IPC socket for receiving messages from the listener.
    #[arg(long = "pipeIn")]
    pipe_in: String,

    /// Path to the IPC socket for sending messages to the listener.
    #[arg(long = "pipeOut")]
    pipe_out: String,
}

fn main() {
    let args = Args::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to build Tokio runtime: {e}");
            std::process::exit(return_code::TERMINATED_ERROR);
        }
    };

    let exit_code = runtime.block_on(run(args));
    std::process::exit(exit_code);
}

async fn run(args: Args) -> i32 {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Worker process starting.");
    tracing::info!("  pipeIn  = {}", args.pipe_in);
    tracing::info!("  pipeOut = {}", args.pipe_out);

    // Cancellation arrives from the listener over the channel; Ctrl-C on the
    // console must not stop the job.
    tokio::spawn(async {
        while tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received; ignored, waiting for the listener to cancel the job.");
        }
    });

    let host_context = HostContext::new("Worker");
    let worker = Worker::new(Arc::clone(&host_context), Arc::new(ScriptJobRunner::new()));
    let host_token = CancellationToken::new();

    match worker
        .run_async(&args.pipe_in, &args.pipe_out, host_token)
        .await
        .context("Worker failed")
    {
        Ok(code) => {
            tracing::info!("Worker exiting with return code {}", code);
            code
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            return_code::TERMINATED_ERROR
        }
    }
}
