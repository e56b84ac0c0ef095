//! Outcomes of refresh and transmit

use std::fmt;

use lifi_port::PortError;
use thiserror::Error;

/// Where a refresh currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Opening every discoverable port
    #[default]
    Discovering,
    /// Challenge byte written, awaiting replies
    Challenging,
    /// Checking replies against the transform
    Confirming,
    /// Trusted set is final until the next refresh or pruning
    Settled,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Discovering => "discovering",
            Phase::Challenging => "challenging",
            Phase::Confirming => "confirming",
            Phase::Settled => "settled",
        };
        f.write_str(name)
    }
}

/// Why a port was dropped from the trusted set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkFailure {
    #[error("write failed: {0}")]
    Write(PortError),

    #[error("wrote {actual} of {expected} byte(s)")]
    CountMismatch { expected: usize, actual: usize },

    #[error("read failed: {0}")]
    Read(PortError),

    #[error("expected reply {expected:#04x}, got {actual:02x?}")]
    Mismatch { expected: u8, actual: Vec<u8> },
}

/// Result of one refresh
#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    /// Challenge byte sent this round
    pub challenge: u8,
    /// Ports that opened
    pub candidates: Vec<String>,
    /// Ports that opened but failed verification
    pub rejected: Vec<(String, LinkFailure)>,
    /// Ports that passed verification
    pub trusted: Vec<String>,
}

impl RefreshReport {
    /// No transmitter passed verification
    pub fn is_empty(&self) -> bool {
        self.trusted.is_empty()
    }
}

/// Result of one transmit
#[derive(Debug, Clone, Default)]
pub struct TransmitReport {
    /// Channel sent
    pub channel: u32,
    /// Trusted ports at the start of the call
    pub attempted: Vec<String>,
    /// Ports dropped during this call
    pub failures: Vec<(String, LinkFailure)>,
    /// Trusted ports after pruning
    pub trusted: Vec<String>,
}

impl TransmitReport {
    /// At least one transmitter confirmed the channel
    pub fn success(&self) -> bool {
        !self.trusted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_messages() {
        let mismatch = LinkFailure::Mismatch {
            expected: b'e',
            actual: vec![b'x'],
        };
        assert_eq!(mismatch.to_string(), "expected reply 0x65, got [78]");

        let count = LinkFailure::CountMismatch {
            expected: 1,
            actual: 0,
        };
        assert_eq!(count.to_string(), "wrote 0 of 1 byte(s)");
    }

    #[test]
    fn test_transmit_success_tracks_survivors() {
        let mut report = TransmitReport {
            channel: 3,
            attempted: vec!["COM3".into()],
            ..Default::default()
        };
        assert!(!report.success());
        report.trusted.push("COM3".into());
        assert!(report.success());
    }
}
