//! Connection parameters shared by every port a client opens

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default bit rate of the transmitter firmware
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Parameters applied to each opened port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSettings {
    /// Bit rate
    pub baud_rate: u32,
    /// Bound on every individual read and write
    pub timeout: Duration,
    /// Wait after a successful open before the port is used
    ///
    /// Boards that reset when the line opens need this to finish booting.
    pub settle_delay: Duration,
}

impl PortSettings {
    /// Settings with the given bit rate and timeout and no settle delay
    pub fn new(baud_rate: u32, timeout: Duration) -> Self {
        Self {
            baud_rate,
            timeout,
            settle_delay: Duration::ZERO,
        }
    }

    /// Replace the settle delay
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: Duration::from_secs(1),
            settle_delay: Duration::from_secs(1),
        }
    }
}
