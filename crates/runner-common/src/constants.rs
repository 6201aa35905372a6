// Constants read by the worker process.

use std::time::Duration;

// ---------------------------------------------------------------------------
// ReturnCode
// ---------------------------------------------------------------------------

/// Process return / exit codes that are not job results.
pub mod return_code {
    pub const TERMINATED_ERROR: i32 = 1;
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// How long the worker waits for the job message after connecting.
pub const WORKER_START_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Variables
// ---------------------------------------------------------------------------

pub mod variables {
    pub mod agent {
        pub const PRINT_LOG_TO_STDOUT: &str = "ACTIONS_RUNNER_PRINT_LOG_TO_STDOUT";
    }

    pub mod system {
        pub const CULTURE: &str = "system.culture";
    }
}
