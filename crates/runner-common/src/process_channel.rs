// ProcessChannel: IPC between the listener (host) and the worker over a pair of Unix domain sockets.

use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;

/// Largest message body accepted in either direction.
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Message types for listener ↔ worker communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum MessageType {
    NotInitialized = -1,
    NewJobRequest = 1,
    CancelRequest = 2,
    RunnerShutdown = 3,
    OperatingSystemShutdown = 4,
}

impl MessageType {
    /// Convert from the wire value. Unknown values decode to `NotInitialized`.
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => MessageType::NewJobRequest,
            2 => MessageType::CancelRequest,
            3 => MessageType::RunnerShutdown,
            4 => MessageType::OperatingSystemShutdown,
            _ => MessageType::NotInitialized,
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageType::NotInitialized => write!(f, "NotInitialized"),
            MessageType::NewJobRequest => write!(f, "NewJobRequest"),
            MessageType::CancelRequest => write!(f, "CancelRequest"),
            MessageType::RunnerShutdown => write!(f, "RunnerShutdown"),
            MessageType::OperatingSystemShutdown => write!(f, "OperatingSystemShutdown"),
        }
    }
}

/// A message exchanged between listener and worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerMessage {
    pub message_type: MessageType,
    pub body: String,
}

impl WorkerMessage {
    pub fn new(message_type: MessageType, body: impl Into<String>) -> Self {
        Self {
            message_type,
            body: body.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("failed to bind IPC socket at {path:?}")]
    Bind {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to connect to IPC socket at {path}")]
    Connect {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("channel not connected")]
    NotConnected,

    #[error("receive was cancelled")]
    Cancelled,

    #[error("IPC message body is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("IPC message body of {0} bytes is over the frame size limit")]
    BodyTooLarge(usize),

    #[error("IPC channel I/O failed")]
    Io(#[from] std::io::Error),
}

/// IPC channel between the listener and worker processes.
///
/// The worker reads from the `pipe_in` socket and writes to the `pipe_out`
/// socket; the listener side is the mirror image. Frames are:
/// - 4 bytes: message type as little-endian i32
/// - 4 bytes: body length as little-endian u32
/// - N bytes: body as UTF-8 string
#[derive(Default)]
pub struct ProcessChannel {
    /// Socket files created by the server side; removed on close.
    socket_paths: Vec<PathBuf>,
    /// Listeners for (pipe_in, pipe_out), server side only, until `accept`.
    listeners: Option<(UnixListener, UnixListener)>,
    reader: Option<UnixStream>,
    writer: Option<UnixStream>,
}

impl ProcessChannel {
    /// Create a new, unconnected `ProcessChannel`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the server side (used by the listener process).
    ///
    /// Binds two sockets under `socket_dir` and returns `(pipe_in, pipe_out)`
    /// as the worker should receive them on its command line.
    pub fn start_server(&mut self, socket_dir: &Path) -> Result<(String, String), ChannelError> {
        let id = uuid::Uuid::new_v4();
        let in_path = socket_dir.join(format!("runner_ipc_{id}_in"));
        let out_path = socket_dir.join(format!("runner_ipc_{id}_out"));

        let bind = |path: &PathBuf| {
            UnixListener::bind(path).map_err(|source| ChannelError::Bind {
                path: path.clone(),
                source,
            })
        };
        let in_listener = bind(&in_path)?;
        self.socket_paths.push(in_path.clone());
        let out_listener = bind(&out_path)?;
        self.socket_paths.push(out_path.clone());

        self.listeners = Some((in_listener, out_listener));
        Ok((
            in_path.to_string_lossy().into_owned(),
            out_path.to_string_lossy().into_owned(),
        ))
    }

    /// Accept the worker's two connections (server side).
    pub async fn accept(&mut self) -> Result<(), ChannelError> {
        let (in_listener, out_listener) = self.listeners.take().ok_or(ChannelError::NotConnected)?;

        // The worker reads what we write on its pipe_in, and vice versa.
        let (writer, _) = in_listener.accept().await?;
        let (reader, _) = out_listener.accept().await?;

        self.writer = Some(writer);
        self.reader = Some(reader);
        Ok(())
    }

    /// Start the client side (used by the worker process).
    pub async fn start_client(&mut self, pipe_in: &str, pipe_out: &str) -> Result<(), ChannelError> {
        let connect = |path: &str| {
            let path = path.to_string();
            async move {
                UnixStream::connect(&path)
                    .await
                    .map_err(|source| ChannelError::Connect { path, source })
            }
        };

        self.reader = Some(connect(pipe_in).await?);
        self.writer = Some(connect(pipe_out).await?);
        Ok(())
    }

    /// Send a message through the channel.
    pub async fn send_async(&mut self, message_type: MessageType, body: &str) -> Result<(), ChannelError> {
        let stream = self.writer.as_mut().ok_or(ChannelError::NotConnected)?;

        let body_bytes = body.as_bytes();
        if body_bytes.len() > MAX_BODY_BYTES {
            return Err(ChannelError::BodyTooLarge(body_bytes.len()));
        }
        let body_len = body_bytes.len() as u32;

        let mut frame = Vec::with_capacity(8 + body_bytes.len());
        frame.extend_from_slice(&(message_type as i32).to_le_bytes());
        frame.extend_from_slice(&body_len.to_le_bytes());
        frame.extend_from_slice(body_bytes);

        stream.write_all(&frame).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Receive one message, or fail with `ChannelError::Cancelled` once `token`
    /// fires. A receive cancelled mid-frame leaves the stream unusable.
    pub async fn receive_async(&mut self, token: &CancellationToken) -> Result<WorkerMessage, ChannelError> {
        let stream = self.reader.as_mut().ok_or(ChannelError::NotConnected)?;

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(ChannelError::Cancelled),
            message = Self::read_message(stream) => message,
        }
    }

    async fn read_message(stream: &mut UnixStream) -> Result<WorkerMessage, ChannelError> {
        let mut header = [0u8; 8];
        stream.read_exact(&mut header).await?;

        let message_type = MessageType::from_i32(i32::from_le_bytes([
            header[0], header[1], header[2], header[3],
        ]));
        let body_len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
        if body_len > MAX_BODY_BYTES {
            return Err(ChannelError::BodyTooLarge(body_len));
        }

        let mut body_buf = vec![0u8; body_len];
        stream.read_exact(&mut body_buf).await?;
        let body = String::from_utf8(body_buf)?;

        Ok(WorkerMessage::new(message_type, body))
    }

    /// Release the streams and remove any socket files this side created.
    /// Safe to call more than once.
    pub fn close(&mut self) {
        self.reader = None;
        self.writer = None;
        self.listeners = None;
        for path in self.socket_paths.drain(..) {
            let _ = std::fs::remove_file(path);
        }
    }
}

impl Drop for ProcessChannel {
    fn drop(&mut self) {
        self.close();
    }
}
