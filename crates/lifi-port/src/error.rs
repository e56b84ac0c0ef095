//! Error types for port operations

use std::io;

use thiserror::Error;

/// Per-port failures
///
/// None of these escalate past the batch layer: a failing port is recorded
/// as a failed outcome for that port only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// Device does not exist
    #[error("port {0} not found")]
    NotFound(String),

    /// Port busy or in use
    #[error("port {0} is busy or in use")]
    Busy(String),

    /// Access to the device was refused
    #[error("permission denied opening {0}")]
    PermissionDenied(String),

    /// The name is not a valid device path
    #[error("invalid port name: {0}")]
    InvalidName(String),

    /// Failed to open serial port for another reason
    #[error("failed to open port {port}: {reason}")]
    OpenFailed { port: String, reason: String },

    /// Operation did not complete within the configured timeout
    #[error("timeout during {op} on {port}")]
    Timeout { port: String, op: &'static str },

    /// I/O error during read or write
    #[error("I/O error on {port}: {reason}")]
    Io { port: String, reason: String },

    /// Port is not currently open in the registry
    #[error("port {0} is not open")]
    NotTracked(String),

    /// The concurrent task running the operation died
    #[error("task for {port} failed: {reason}")]
    TaskFailed { port: String, reason: String },

    /// Failed to enumerate serial ports
    #[error("failed to enumerate ports: {0}")]
    EnumerationFailed(String),
}

impl PortError {
    /// Classify an open failure reported by the serial driver
    pub fn from_serial(port: &str, err: &serialport::Error) -> Self {
        match err.kind() {
            serialport::ErrorKind::NoDevice => Self::NotFound(port.to_string()),
            serialport::ErrorKind::InvalidInput => Self::InvalidName(port.to_string()),
            serialport::ErrorKind::Io(kind) => Self::classify_open(port, kind, &err.description),
            serialport::ErrorKind::Unknown => Self::OpenFailed {
                port: port.to_string(),
                reason: err.description.clone(),
            },
        }
    }

    /// Wrap an I/O error raised mid-operation
    pub fn from_io(port: &str, err: &io::Error) -> Self {
        if err.kind() == io::ErrorKind::TimedOut {
            return Self::Timeout {
                port: port.to_string(),
                op: "i/o",
            };
        }
        Self::Io {
            port: port.to_string(),
            reason: err.to_string(),
        }
    }

    fn classify_open(port: &str, kind: io::ErrorKind, description: &str) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound(port.to_string()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(port.to_string()),
            io::ErrorKind::InvalidInput => Self::InvalidName(port.to_string()),
            _ if description.to_ascii_lowercase().contains("busy") => Self::Busy(port.to_string()),
            _ => Self::OpenFailed {
                port: port.to_string(),
                reason: description.to_string(),
            },
        }
    }

    /// Whether this failure happened while acquiring the device
    pub fn is_open_failure(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::Busy(_)
                | Self::PermissionDenied(_)
                | Self::InvalidName(_)
                | Self::OpenFailed { .. }
        )
    }
}
