//! Opened port handle with bounded read and write
//!
//! A [`Port`] exists only while the underlying endpoint is open; closing it
//! consumes the value. Every operation is bounded by the timeout the port was
//! opened with and reports failures as [`PortError`] values.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, trace};

use crate::error::PortError;
use crate::settings::PortSettings;

/// Chunk size used when reading everything that is available
const READ_CHUNK: usize = 256;

/// An open communication endpoint
///
/// Generic over the I/O type to support both real serial ports and simulated
/// endpoints. For simulated endpoints, use `DuplexStream` from
/// `tokio::io::duplex()`.
#[derive(Debug)]
pub struct Port<S> {
    name: String,
    stream: S,
    baud_rate: u32,
    timeout: Duration,
}

impl<S> Port<S> {
    /// Wrap an opened stream
    ///
    /// `name` must be the canonical name reported by the opened handle.
    pub fn new(name: impl Into<String>, stream: S, settings: &PortSettings) -> Self {
        Self {
            name: name.into(),
            stream,
            baud_rate: settings.baud_rate,
            timeout: settings.timeout,
        }
    }

    /// Canonical port name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured bit rate
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Configured read/write timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Borrow the underlying stream
    pub fn get_ref(&self) -> &S {
        &self.stream
    }
}

impl<S> Port<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Read up to `max_bytes`, or whatever is available when `max_bytes == 0`
    ///
    /// Partial reads are accumulated until `max_bytes` arrive or the timeout
    /// elapses. Reaching the deadline with nothing read is a timeout; reaching
    /// it with a partial buffer returns the partial buffer.
    pub async fn read(&mut self, max_bytes: usize) -> Result<Vec<u8>, PortError> {
        let deadline = Instant::now() + self.timeout;
        if max_bytes == 0 {
            return self.read_available(deadline).await;
        }

        let mut buf = vec![0u8; max_bytes];
        let mut filled = 0;
        while filled < max_bytes {
            match timeout_at(deadline, self.stream.read(&mut buf[filled..])).await {
                Ok(Ok(0)) => {
                    if filled == 0 {
                        return Err(self.closed_error());
                    }
                    break;
                }
                Ok(Ok(n)) => filled += n,
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::WouldBlock => continue,
                Ok(Err(e)) => return Err(PortError::from_io(&self.name, &e)),
                Err(_) => break,
            }
        }

        if filled == 0 {
            trace!("Read timeout on {}", self.name);
            return Err(self.timeout_error("read"));
        }
        buf.truncate(filled);
        trace!("{} in: {:02X?}", self.name, buf);
        Ok(buf)
    }

    /// Wait for the first chunk, then drain whatever is already buffered
    async fn read_available(&mut self, deadline: Instant) -> Result<Vec<u8>, PortError> {
        let mut chunk = [0u8; READ_CHUNK];
        let mut out = match timeout_at(deadline, self.stream.read(&mut chunk)).await {
            Ok(Ok(0)) => return Err(self.closed_error()),
            Ok(Ok(n)) => chunk[..n].to_vec(),
            Ok(Err(e)) => return Err(PortError::from_io(&self.name, &e)),
            Err(_) => return Err(self.timeout_error("read")),
        };

        // A zero timeout still polls the read once, so this only picks up
        // bytes that are already waiting.
        while let Ok(Ok(n)) = timeout(Duration::ZERO, self.stream.read(&mut chunk)).await {
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }

        trace!("{} in: {:02X?}", self.name, out);
        Ok(out)
    }

    /// Discard bytes already waiting on the stream without waiting for more
    ///
    /// Returns the number of bytes discarded.
    pub async fn clear_input(&mut self) -> Result<usize, PortError> {
        let mut chunk = [0u8; READ_CHUNK];
        let mut discarded = 0;
        loop {
            match timeout(Duration::ZERO, self.stream.read(&mut chunk)).await {
                Ok(Ok(0)) | Err(_) => break,
                Ok(Ok(n)) => discarded += n,
                Ok(Err(e)) => return Err(PortError::from_io(&self.name, &e)),
            }
        }
        if discarded > 0 {
            trace!("{} discarded {} stale byte(s)", self.name, discarded);
        }
        Ok(discarded)
    }

    /// Write the whole payload and flush it to the wire
    ///
    /// Returns the number of bytes written.
    pub async fn write(&mut self, payload: &[u8]) -> Result<usize, PortError> {
        let stream = &mut self.stream;
        let result = timeout(self.timeout, async move {
            stream.write_all(payload).await?;
            stream.flush().await?;
            Ok::<_, std::io::Error>(payload.len())
        })
        .await;

        match result {
            Ok(Ok(n)) => {
                trace!("{} out: {:02X?} ({} bytes)", self.name, payload, n);
                Ok(n)
            }
            Ok(Err(e)) => Err(PortError::from_io(&self.name, &e)),
            Err(_) => Err(self.timeout_error("write")),
        }
    }

    /// Release the endpoint
    ///
    /// The handle is gone afterwards either way; an error only reports that
    /// the shutdown did not complete cleanly.
    pub async fn close(mut self) -> Result<(), PortError> {
        match timeout(self.timeout, self.stream.shutdown()).await {
            Ok(Ok(())) => {
                debug!("Closed {}", self.name);
                Ok(())
            }
            Ok(Err(e)) => {
                debug!("Shutdown of {} failed: {}", self.name, e);
                Err(PortError::from_io(&self.name, &e))
            }
            Err(_) => {
                debug!("Shutdown of {} timed out", self.name);
                Err(self.timeout_error("close"))
            }
        }
    }

    fn timeout_error(&self, op: &'static str) -> PortError {
        PortError::Timeout {
            port: self.name.clone(),
            op,
        }
    }

    fn closed_error(&self) -> PortError {
        PortError::Io {
            port: self.name.clone(),
            reason: "connection closed".to_string(),
        }
    }
}
