//! Platform-specific pipe/socket implementation.
//!
//! - Unix: Unix Domain Socket
//! - Windows: Named Pipe
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> bawire::error::Result<()> {
//! use bawire::transport::{generate_pipe_path, PipeListener, PipeStream};
//!
//! let path = generate_pipe_path();
//! let mut listener = PipeListener::bind(&path).await?;
//! let client = tokio::spawn({
//!     let path = path.clone();
//!     async move { PipeStream::connect(&path).await }
//! });
//! let server_side = listener.accept().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use tokio::io::{AsyncRead, AsyncWrite};

/// Generate a unique pipe path for this process.
///
/// Format:
/// - Unix: `/tmp/bawire-{pid}-{random}.sock`
/// - Windows: `\\.\pipe\bawire-{pid}-{random}`
pub fn generate_pipe_path() -> String {
    let pid = std::process::id();
    let rand: u64 = rand_u64();

    #[cfg(unix)]
    {
        format!("/tmp/bawire-{}-{:x}.sock", pid, rand)
    }

    #[cfg(windows)]
    {
        format!(r"\\.\pipe\bawire-{}-{:x}", pid, rand)
    }
}

/// Simple random u64 using system time, process ID and a call counter.
fn rand_u64() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let pid = std::process::id() as u64;
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    nanos.wrapping_mul(0x517cc1b727220a95) ^ pid ^ seq.rotate_left(32)
}

// ============================================================================
// Unix Implementation
// ============================================================================

#[cfg(unix)]
mod unix_impl {
    use super::*;
    use std::path::Path;
    use tokio::net::{UnixListener, UnixStream};

    /// Unix Domain Socket listener (engine side).
    pub struct PipeListener {
        listener: UnixListener,
        path: String,
    }

    /// Connected Unix Domain Socket, either side.
    pub struct PipeStream {
        stream: UnixStream,
    }

    impl PipeListener {
        /// Bind to a Unix socket path.
        ///
        /// Removes any existing socket file at the path before binding.
        pub async fn bind(path: &str) -> Result<Self> {
            if Path::new(path).exists() {
                std::fs::remove_file(path)?;
            }

            let listener = UnixListener::bind(path)?;
            tracing::debug!(path, "pipe listener bound");

            Ok(Self {
                listener,
                path: path.to_string(),
            })
        }

        /// Accept a single connection.
        pub async fn accept(&mut self) -> Result<PipeStream> {
            let (stream, _addr) = self.listener.accept().await?;
            Ok(PipeStream { stream })
        }

        /// Get the socket path.
        pub fn path(&self) -> &str {
            &self.path
        }
    }

    impl Drop for PipeListener {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    impl PipeStream {
        /// Connect to a listening endpoint (BA side).
        pub async fn connect(path: &str) -> Result<Self> {
            let stream = UnixStream::connect(path).await?;
            Ok(Self { stream })
        }
    }

    impl AsyncRead for PipeStream {
        fn poll_read(
            mut self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
            buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::pin::Pin::new(&mut self.stream).poll_read(cx, buf)
        }
    }

    impl AsyncWrite for PipeStream {
        fn poll_write(
            mut self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
            buf: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            std::pin::Pin::new(&mut self.stream).poll_write(cx, buf)
        }

        fn poll_flush(
            mut self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::pin::Pin::new(&mut self.stream).poll_flush(cx)
        }

        fn poll_shutdown(
            mut self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::pin::Pin::new(&mut self.stream).poll_shutdown(cx)
        }
    }
}

// ============================================================================
// Windows Implementation
// ============================================================================

#[cfg(windows)]
mod windows_impl {
    use super::*;
    use std::time::Duration;
    use tokio::net::windows::named_pipe::{
        ClientOptions, NamedPipeClient, NamedPipeServer, ServerOptions,
    };

    /// `ERROR_PIPE_BUSY`: every server instance is taken, try again shortly.
    const ERROR_PIPE_BUSY: i32 = 231;

    /// Windows Named Pipe listener (engine side).
    pub struct PipeListener {
        path: String,
        next: NamedPipeServer,
    }

    /// Connected Named Pipe, either side.
    pub enum PipeStream {
        Server(NamedPipeServer),
        Client(NamedPipeClient),
    }

    impl PipeListener {
        /// Create the first Named Pipe server instance.
        pub async fn bind(path: &str) -> Result<Self> {
            let next = ServerOptions::new()
                .first_pipe_instance(true)
                .create(path)?;
            tracing::debug!(path, "pipe listener bound");

            Ok(Self {
                path: path.to_string(),
                next,
            })
        }

        /// Accept a single connection.
        ///
        /// A fresh server instance is created before handing out the
        /// connected one so the name stays reachable.
        pub async fn accept(&mut self) -> Result<PipeStream> {
            self.next.connect().await?;
            let fresh = ServerOptions::new().create(&self.path)?;
            let connected = std::mem::replace(&mut self.next, fresh);
            Ok(PipeStream::Server(connected))
        }

        /// Get the pipe path.
        pub fn path(&self) -> &str {
            &self.path
        }
    }

    impl PipeStream {
        /// Connect to a listening endpoint (BA side).
        pub async fn connect(path: &str) -> Result<Self> {
            loop {
                match ClientOptions::new().open(path) {
                    Ok(client) => return Ok(PipeStream::Client(client)),
                    Err(e) if e.raw_os_error() == Some(ERROR_PIPE_BUSY) => {}
                    Err(e) => return Err(e.into()),
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
    }

    impl AsyncRead for PipeStream {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
            buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            match self.get_mut() {
                PipeStream::Server(pipe) => std::pin::Pin::new(pipe).poll_read(cx, buf),
                PipeStream::Client(pipe) => std::pin::Pin::new(pipe).poll_read(cx, buf),
            }
        }
    }

    impl AsyncWrite for PipeStream {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
            buf: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            match self.get_mut() {
                PipeStream::Server(pipe) => std::pin::Pin::new(pipe).poll_write(cx, buf),
                PipeStream::Client(pipe) => std::pin::Pin::new(pipe).poll_write(cx, buf),
            }
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            match self.get_mut() {
                PipeStream::Server(pipe) => std::pin::Pin::new(pipe).poll_flush(cx),
                PipeStream::Client(pipe) => std::pin::Pin::new(pipe).poll_flush(cx),
            }
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            match self.get_mut() {
                PipeStream::Server(pipe) => std::pin::Pin::new(pipe).poll_shutdown(cx),
                PipeStream::Client(pipe) => std::pin::Pin::new(pipe).poll_shutdown(cx),
            }
        }
    }
}

// ============================================================================
// Platform-independent re-exports
// ============================================================================

#[cfg(unix)]
pub use unix_impl::{PipeListener, PipeStream};

#[cfg(windows)]
pub use windows_impl::{PipeListener, PipeStream};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_pipe_path_format() {
        let path = generate_pipe_path();

        #[cfg(unix)]
        {
            assert!(path.starts_with("/tmp/bawire-"));
            assert!(path.ends_with(".sock"));
        }

        #[cfg(windows)]
        {
            assert!(path.starts_with(r"\\.\pipe\bawire-"));
        }
    }

    #[test]
    fn test_generate_pipe_path_uniqueness() {
        let paths: Vec<String> = (0..10).map(|_| generate_pipe_path()).collect();

        for (i, p1) in paths.iter().enumerate() {
            for (j, p2) in paths.iter().enumerate() {
                if i != j {
                    assert_ne!(p1, p2, "Paths should be unique");
                }
            }
        }
    }

    #[test]
    fn test_pipe_path_contains_pid() {
        let path = generate_pipe_path();
        let pid = std::process::id().to_string();
        assert!(path.contains(&pid), "Path should contain PID");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_bind_connect_accept() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let path = generate_pipe_path();
        let mut listener = PipeListener::bind(&path).await.unwrap();

        let client_path = path.clone();
        let client = tokio::spawn(async move {
            let mut stream = PipeStream::connect(&client_path).await.unwrap();
            stream.write_all(b"ping").await.unwrap();
        });

        let mut server = listener.accept().await.unwrap();
        let mut buf = [0u8; 4];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");
        client.await.unwrap();

        drop(listener);
        assert!(!std::path::Path::new(&path).exists());
    }
}
