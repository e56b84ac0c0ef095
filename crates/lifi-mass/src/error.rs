//! Error types for batch operations

use thiserror::Error;

/// Batch-level failures
///
/// Per-port faults never show up here; they are outcomes inside a
/// [`BatchResult`](crate::BatchResult).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MassError {
    /// The effective port set was empty before any I/O was attempted
    #[error("no ports available")]
    NoPorts,
}
