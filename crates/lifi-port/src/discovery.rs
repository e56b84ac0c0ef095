//! Candidate port discovery
//!
//! Two strategies sit behind the same interface: asking the driver to
//! enumerate OS-visible ports, and probing a fixed numbered naming scheme.
//! Enumeration falls back to probing when the driver cannot enumerate.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::driver::PortDriver;

/// Upper bound on the number of probed names
pub const MAX_PROBE_CANDIDATES: usize = 256;

/// Fixed numbered naming scheme, e.g. `COM1..COM256`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeScheme {
    /// Name prefix
    pub prefix: String,
    /// First number
    pub first: u32,
    /// Number of candidates, capped at [`MAX_PROBE_CANDIDATES`]
    pub count: usize,
}

impl ProbeScheme {
    /// All names in the scheme
    ///
    /// Numbering stops at `u32::MAX` rather than wrapping.
    pub fn names(&self) -> Vec<String> {
        let count = self.count.min(MAX_PROBE_CANDIDATES);
        (0..count as u32)
            .map_while(|i| self.first.checked_add(i))
            .map(|n| format!("{}{}", self.prefix, n))
            .collect()
    }
}

impl Default for ProbeScheme {
    fn default() -> Self {
        if cfg!(windows) {
            Self {
                prefix: "COM".to_string(),
                first: 1,
                count: MAX_PROBE_CANDIDATES,
            }
        } else {
            Self {
                prefix: "/dev/ttyUSB".to_string(),
                first: 0,
                count: MAX_PROBE_CANDIDATES,
            }
        }
    }
}

/// Discovery strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMode {
    /// Ask the driver, fall back to probing
    #[default]
    Enumerate,
    /// Always probe the numbered scheme
    Probe,
}

/// Discovery configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Discovery {
    /// Strategy
    #[serde(default)]
    pub mode: DiscoveryMode,
    /// Numbered scheme used by probing
    #[serde(default)]
    pub probe: ProbeScheme,
}

impl Discovery {
    /// Probe only
    pub fn probe(scheme: ProbeScheme) -> Self {
        Self {
            mode: DiscoveryMode::Probe,
            probe: scheme,
        }
    }

    /// Build the candidate name set
    pub fn candidates<D: PortDriver>(&self, driver: &D) -> Vec<String> {
        if self.mode == DiscoveryMode::Enumerate {
            if let Some(names) = driver.enumerate() {
                info!("Discovered {} candidate port(s)", names.len());
                return names;
            }
            debug!("Port enumeration unavailable, probing {}*", self.probe.prefix);
        }
        self.probe.names()
    }
}
