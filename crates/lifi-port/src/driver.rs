//! The port capability trait

use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::PortError;
use crate::port::Port;
use crate::settings::PortSettings;

/// Provider of openable endpoints
///
/// Implemented by [`SerialDriver`](crate::SerialDriver) for hardware and by
/// the simulation crate for tests.
pub trait PortDriver: Send + Sync + 'static {
    /// Stream type of an opened endpoint
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Open the named endpoint
    ///
    /// Expected failures (missing, busy, denied, malformed name) are returned
    /// as errors. The returned port carries the canonical name read back from
    /// the opened handle, which may differ from `name`.
    fn open(&self, name: &str, settings: &PortSettings) -> Result<Port<Self::Stream>, PortError>;

    /// List candidate names visible to the OS
    ///
    /// `None` means enumeration is unavailable and callers should fall back
    /// to probing a numbered naming scheme.
    fn enumerate(&self) -> Option<Vec<String>> {
        None
    }
}
