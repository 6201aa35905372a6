// Fatal worker errors. Anything raised before the job starts ends the process
// with a non-zero exit code; job failures travel as `TaskResult` instead.

use runner_common::{ChannelError, MessageType, SecretMaskerError};
use runner_sdk::ArgError;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error(transparent)]
    InvalidArgument(#[from] ArgError),

    #[error("IPC channel failure")]
    Channel(#[from] ChannelError),

    #[error("no job message received from the channel within {0:?}")]
    StartupTimeout(Duration),

    #[error("unexpected message type: expected {expected}, got {actual}")]
    UnexpectedMessage {
        expected: MessageType,
        actual: MessageType,
    },

    #[error("job message body is empty")]
    EmptyMessageBody,

    #[error("job message body is not a valid job request")]
    InvalidJobMessage(#[source] serde_json::Error),

    #[error("job message body deserialized to null")]
    NullJobMessage,

    #[error("job message has no environment")]
    MissingEnvironment,

    #[error("job environment has no variables")]
    MissingVariables,

    #[error("job variable '{0}' is missing or empty")]
    MissingCulture(String),

    #[error("mask hint could not be installed")]
    InvalidMaskHint(#[from] SecretMaskerError),
}
