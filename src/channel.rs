//! Framed, half-duplex request/response channel.
//!
//! A [`PipeChannel`] wraps any `AsyncRead + AsyncWrite` stream (a
//! [`PipeStream`], or `tokio::io::duplex` in tests) and moves through:
//!
//! ```text
//! Disconnected -> Connected -> (Sending -> WaitingForResponse -> Connected)* -> Closed
//! ```
//!
//! Every operation takes `&mut self`, so at most one call is in flight.
//!
//! # Example
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> bawire::error::Result<()> {
//! use bawire::channel::PipeChannel;
//!
//! let (a, b) = tokio::io::duplex(1024);
//! let mut client = PipeChannel::new(a);
//! let mut server = PipeChannel::new(b);
//!
//! let echo = tokio::spawn(async move {
//!     let message = server.receive_message().await?.unwrap();
//!     server.send_message(message.message_type, &message.payload).await
//! });
//!
//! let reply = client.call(7, b"ping").await?;
//! assert_eq!(&reply[..], b"ping");
//! # echo.await.unwrap()?;
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::codec::{BufferReader, BufferWriter};
use crate::error::{BawireError, Result};
use crate::protocol::{
    build_frame, FrameBuffer, Message, ABSOLUTE_MAX_PAYLOAD_SIZE, DEFAULT_MAX_PAYLOAD_SIZE,
    HANDSHAKE_MESSAGE_TYPE,
};
use crate::status::Status;
use crate::transport::{PipeListener, PipeStream};

/// Default read buffer size (64KB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Channel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Frames declaring a larger payload are rejected before it is read,
    /// and larger payloads are refused on send. Capped at
    /// [`ABSOLUTE_MAX_PAYLOAD_SIZE`].
    pub max_payload_size: u32,
    /// Size of each socket read.
    pub read_buffer_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

impl ChannelConfig {
    /// Set the maximum payload size, capped at [`ABSOLUTE_MAX_PAYLOAD_SIZE`].
    pub fn max_payload_size(mut self, size: u32) -> Self {
        self.max_payload_size = size.min(ABSOLUTE_MAX_PAYLOAD_SIZE);
        self
    }

    /// The limit actually applied, whatever was deserialized.
    pub fn effective_max_payload_size(&self) -> u32 {
        self.max_payload_size.min(ABSOLUTE_MAX_PAYLOAD_SIZE)
    }

    /// Set the read buffer size.
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }
}

/// Channel lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connected,
    Sending,
    WaitingForResponse,
    Closed,
}

/// Framed channel over a byte stream.
pub struct PipeChannel<S> {
    stream: Option<S>,
    frame_buffer: FrameBuffer,
    pending: VecDeque<Message>,
    read_buf: Vec<u8>,
    max_payload_size: u32,
    state: ChannelState,
}

impl<S> PipeChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create a connected channel over `stream` with default settings.
    pub fn new(stream: S) -> Self {
        Self::with_config(ChannelConfig::default()).attach(stream)
    }

    /// Create a disconnected channel.
    pub fn with_config(config: ChannelConfig) -> Self {
        let max_payload_size = config.effective_max_payload_size();
        Self {
            stream: None,
            frame_buffer: FrameBuffer::with_max_payload(max_payload_size),
            pending: VecDeque::new(),
            read_buf: vec![0u8; config.read_buffer_size.max(1)],
            max_payload_size,
            state: ChannelState::Disconnected,
        }
    }

    /// Attach a connected stream.
    pub fn attach(mut self, stream: S) -> Self {
        self.stream = Some(stream);
        self.frame_buffer.clear();
        self.pending.clear();
        self.state = ChannelState::Connected;
        self
    }

    /// Current state.
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Check if the channel can carry traffic.
    pub fn is_open(&self) -> bool {
        !matches!(
            self.state,
            ChannelState::Closed | ChannelState::Disconnected
        )
    }

    fn stream_mut(&mut self) -> Result<&mut S> {
        if !self.is_open() {
            return Err(BawireError::ConnectionClosed);
        }
        self.stream.as_mut().ok_or(BawireError::ConnectionClosed)
    }

    fn fail<T>(&mut self, err: BawireError) -> Result<T> {
        self.state = ChannelState::Closed;
        Err(err)
    }

    /// Write one `[type][length][payload]` frame.
    ///
    /// A payload over the configured maximum is refused before anything is
    /// written, and the channel stays usable.
    pub async fn send_message(&mut self, message_type: u32, payload: &[u8]) -> Result<()> {
        if payload.len() > self.max_payload_size as usize {
            tracing::warn!(message_type, len = payload.len(), "payload too large to send");
            return Err(BawireError::Protocol(format!(
                "Payload size {} exceeds maximum {}",
                payload.len(),
                self.max_payload_size
            )));
        }
        self.stream_mut()?;
        let frame = build_frame(message_type, payload);

        let previous = self.state;
        self.state = ChannelState::Sending;

        let stream = match self.stream.as_mut() {
            Some(stream) => stream,
            None => return self.fail(BawireError::ConnectionClosed),
        };
        let written = async {
            stream.write_all(&frame).await?;
            stream.flush().await
        }
        .await;

        if let Err(e) = written {
            tracing::warn!(message_type, "write failed: {}", e);
            return self.fail(BawireError::Transport(e));
        }

        self.state = previous;
        Ok(())
    }

    /// Wait for the next complete frame.
    ///
    /// Returns `Ok(None)` when the peer closes the stream between frames. A
    /// stream that ends inside a frame is a protocol error. Either way the
    /// channel is closed afterwards.
    pub async fn receive_message(&mut self) -> Result<Option<Message>> {
        self.stream_mut()?;

        loop {
            if let Some(message) = self.pending.pop_front() {
                return Ok(Some(message));
            }

            let stream = match self.stream.as_mut() {
                Some(stream) => stream,
                None => return self.fail(BawireError::ConnectionClosed),
            };
            let n = match stream.read(&mut self.read_buf).await {
                Ok(n) => n,
                Err(e) => return self.fail(BawireError::Transport(e)),
            };

            if n == 0 {
                if self.frame_buffer.has_partial() {
                    tracing::error!(
                        buffered = self.frame_buffer.len(),
                        "peer closed mid-frame"
                    );
                    return self.fail(BawireError::Protocol(
                        "Stream ended inside a frame".to_string(),
                    ));
                }
                tracing::debug!("peer closed channel");
                self.state = ChannelState::Closed;
                return Ok(None);
            }

            match self.frame_buffer.push(&self.read_buf[..n]) {
                Ok(messages) => self.pending.extend(messages),
                Err(e) => return self.fail(e),
            }
        }
    }

    /// Send a request and wait for its reply.
    ///
    /// The reply must carry the same message type.
    pub async fn call(&mut self, message_type: u32, payload: &[u8]) -> Result<Bytes> {
        self.send_message(message_type, payload).await?;
        self.state = ChannelState::WaitingForResponse;

        match self.receive_message().await? {
            Some(reply) if reply.message_type == message_type => {
                self.state = ChannelState::Connected;
                Ok(reply.payload)
            }
            Some(reply) => self.fail(BawireError::Protocol(format!(
                "Expected reply to message {}, got message {}",
                message_type, reply.message_type
            ))),
            None => self.fail(BawireError::ConnectionClosed),
        }
    }

    /// Shut the stream down and close the channel.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
        self.state = ChannelState::Closed;
    }

    /// Client half of the handshake: present `secret` and our process id.
    pub async fn client_handshake(&mut self, secret: &str, process_id: u32) -> Result<()> {
        let mut writer = BufferWriter::new();
        writer.write_string(Some(secret));
        writer.write_u32(process_id);

        let reply = self.call(HANDSHAKE_MESSAGE_TYPE, &writer.freeze()).await?;
        let status = Status(BufferReader::new(&reply).read_u32()?);

        if status.is_failure() {
            tracing::warn!(%status, "handshake rejected");
            self.close().await;
            return Err(BawireError::Failure(status));
        }

        tracing::debug!(process_id, "handshake complete");
        Ok(())
    }

    /// Server half of the handshake: check the secret, return the peer pid.
    pub async fn server_handshake(&mut self, secret: &str) -> Result<u32> {
        let message = match self.receive_message().await? {
            Some(message) => message,
            None => return Err(BawireError::ConnectionClosed),
        };

        if message.message_type != HANDSHAKE_MESSAGE_TYPE {
            self.close().await;
            return Err(BawireError::Protocol(format!(
                "Expected handshake, got message {}",
                message.message_type
            )));
        }

        let mut reader = BufferReader::new(&message.payload);
        let presented = reader.read_string()?;
        let process_id = reader.read_u32()?;

        let accepted = presented.as_deref() == Some(secret);
        let status = if accepted {
            Status::OK
        } else {
            Status::INVALID_ARGUMENT
        };

        let mut writer = BufferWriter::with_capacity(4);
        writer.write_u32(status.0);
        self.send_message(HANDSHAKE_MESSAGE_TYPE, &writer.freeze())
            .await?;

        if !accepted {
            tracing::warn!(process_id, "handshake secret mismatch");
            self.close().await;
            return Err(BawireError::InvalidArgument(
                "handshake secret mismatch".to_string(),
            ));
        }

        tracing::debug!(process_id, "handshake accepted");
        Ok(process_id)
    }
}

impl PipeChannel<PipeStream> {
    /// Connect to `path` and perform the client handshake.
    pub async fn connect(path: &str, secret: &str, config: ChannelConfig) -> Result<Self> {
        let stream = PipeStream::connect(path).await?;
        let mut channel = Self::with_config(config).attach(stream);
        channel.client_handshake(secret, std::process::id()).await?;
        Ok(channel)
    }

    /// Accept one connection and perform the server handshake.
    ///
    /// Returns the channel and the peer's process id.
    pub async fn accept(
        listener: &mut PipeListener,
        secret: &str,
        config: ChannelConfig,
    ) -> Result<(Self, u32)> {
        let stream = listener.accept().await?;
        let mut channel = Self::with_config(config).attach(stream);
        let process_id = channel.server_handshake(secret).await?;
        Ok((channel, process_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Header;
    use tokio::io::{duplex, DuplexStream};

    fn pair() -> (PipeChannel<DuplexStream>, PipeChannel<DuplexStream>) {
        let (a, b) = duplex(4096);
        (PipeChannel::new(a), PipeChannel::new(b))
    }

    #[test]
    fn test_config_builder() {
        let config = ChannelConfig::default()
            .max_payload_size(1024)
            .read_buffer_size(512);
        assert_eq!(config.max_payload_size, 1024);
        assert_eq!(config.read_buffer_size, 512);
    }

    #[tokio::test]
    async fn test_initial_states() {
        let disconnected: PipeChannel<DuplexStream> =
            PipeChannel::with_config(ChannelConfig::default());
        assert_eq!(disconnected.state(), ChannelState::Disconnected);

        let (client, _server) = pair();
        assert_eq!(client.state(), ChannelState::Connected);
    }

    #[tokio::test]
    async fn test_disconnected_channel_rejects_send() {
        let mut channel: PipeChannel<DuplexStream> =
            PipeChannel::with_config(ChannelConfig::default());
        let result = channel.send_message(1, b"x").await;
        assert!(matches!(result, Err(BawireError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_send_and_receive() {
        let (mut client, mut server) = pair();

        client.send_message(5, b"hello").await.unwrap();
        client.send_message(6, b"").await.unwrap();

        let first = server.receive_message().await.unwrap().unwrap();
        assert_eq!(first.message_type, 5);
        assert_eq!(first.payload(), b"hello");

        let second = server.receive_message().await.unwrap().unwrap();
        assert_eq!(second.message_type, 6);
        assert!(second.payload.is_empty());
    }

    #[tokio::test]
    async fn test_end_of_stream_between_frames() {
        let (mut client, mut server) = pair();
        client.close().await;

        assert!(server.receive_message().await.unwrap().is_none());
        assert_eq!(server.state(), ChannelState::Closed);
    }

    #[tokio::test]
    async fn test_truncated_frame_is_protocol_error() {
        let (mut raw, b) = duplex(4096);
        let mut server = PipeChannel::new(b);

        raw.write_all(&Header::new(3, 10).encode()).await.unwrap();
        raw.write_all(b"abc").await.unwrap();
        drop(raw);

        let result = server.receive_message().await;
        assert!(matches!(result, Err(BawireError::Protocol(_))));
        assert_eq!(server.state(), ChannelState::Closed);

        let again = server.send_message(1, b"").await;
        assert!(matches!(again, Err(BawireError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let (mut raw, b) = duplex(4096);
        let mut server =
            PipeChannel::with_config(ChannelConfig::default().max_payload_size(8)).attach(b);

        raw.write_all(&Header::new(3, 9).encode()).await.unwrap();

        let result = server.receive_message().await;
        assert!(matches!(result, Err(BawireError::Protocol(msg)) if msg.contains("exceeds")));
    }

    #[test]
    fn test_max_payload_size_capped_at_absolute() {
        let config = ChannelConfig::default().max_payload_size(u32::MAX);
        assert_eq!(config.max_payload_size, ABSOLUTE_MAX_PAYLOAD_SIZE);

        let config = ChannelConfig {
            max_payload_size: u32::MAX,
            ..Default::default()
        };
        assert_eq!(config.effective_max_payload_size(), ABSOLUTE_MAX_PAYLOAD_SIZE);
    }

    #[tokio::test]
    async fn test_oversized_send_refused_without_closing() {
        let (a, b) = duplex(4096);
        let mut client =
            PipeChannel::with_config(ChannelConfig::default().max_payload_size(8)).attach(a);
        let mut server = PipeChannel::new(b);

        let result = client.send_message(3, &[0u8; 9]).await;
        assert!(matches!(result, Err(BawireError::Protocol(msg)) if msg.contains("exceeds")));
        assert_eq!(client.state(), ChannelState::Connected);

        client.send_message(3, &[7u8; 8]).await.unwrap();
        let message = server.receive_message().await.unwrap().unwrap();
        assert_eq!(message.message_type, 3);
        assert_eq!(message.payload(), &[7u8; 8]);
    }

    #[tokio::test]
    async fn test_call_round_trip() {
        let (mut client, mut server) = pair();

        let echo = tokio::spawn(async move {
            let message = server.receive_message().await.unwrap().unwrap();
            server
                .send_message(message.message_type, &message.payload)
                .await
                .unwrap();
        });

        let reply = client.call(9, b"payload").await.unwrap();
        assert_eq!(&reply[..], b"payload");
        assert_eq!(client.state(), ChannelState::Connected);
        echo.await.unwrap();
    }

    #[tokio::test]
    async fn test_call_rejects_mismatched_reply() {
        let (mut client, mut server) = pair();

        tokio::spawn(async move {
            server.receive_message().await.unwrap();
            server.send_message(2, b"").await.unwrap();
        });

        let result = client.call(1, b"").await;
        assert!(matches!(result, Err(BawireError::Protocol(_))));
        assert_eq!(client.state(), ChannelState::Closed);
    }

    #[tokio::test]
    async fn test_call_peer_gone() {
        let (mut client, mut server) = pair();

        tokio::spawn(async move {
            server.receive_message().await.unwrap();
            server.close().await;
        });

        let result = client.call(1, b"").await;
        assert!(matches!(result, Err(BawireError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_handshake_accepts_secret() {
        let (mut client, mut server) = pair();

        let server_task = tokio::spawn(async move { server.server_handshake("s3cret").await });

        client.client_handshake("s3cret", 4242).await.unwrap();
        assert_eq!(server_task.await.unwrap().unwrap(), 4242);
    }

    #[tokio::test]
    async fn test_handshake_rejects_wrong_secret() {
        let (mut client, mut server) = pair();

        let server_task = tokio::spawn(async move {
            let result = server.server_handshake("right").await;
            (result, server.state())
        });

        let result = client.client_handshake("wrong", 1).await;
        assert!(matches!(
            result,
            Err(BawireError::Failure(status)) if status == Status::INVALID_ARGUMENT
        ));
        assert_eq!(client.state(), ChannelState::Closed);

        let (server_result, server_state) = server_task.await.unwrap();
        assert!(matches!(server_result, Err(BawireError::InvalidArgument(_))));
        assert_eq!(server_state, ChannelState::Closed);
    }
}
