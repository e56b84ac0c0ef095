//! Application settings

use std::path::PathBuf;
use std::time::Duration;

use lifi_link::{Challenge, LinkConfig, ReplyTransform, DEFAULT_CHANNEL_UPPER_BOUND};
use lifi_port::{Discovery, PortScanner, PortSettings, ScannerConfig, SerialDriver};
use lifi_sim::{SimBehavior, SimDriver, SimEndpointConfig};
use serde::{Deserialize, Serialize};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Baud rate for every port
    pub baud_rate: u32,
    /// Per-operation timeout in milliseconds
    pub timeout_ms: u64,
    /// Wait after opening a port, in milliseconds
    pub settle_ms: u64,
    /// Highest selectable channel
    pub channel_upper_bound: u32,
    /// How candidate ports are found
    pub discovery: Discovery,
    /// Which OS-enumerated ports count as candidates
    pub scanner: ScannerConfig,
    /// Fixed challenge byte; a fresh random byte per refresh when unset
    pub challenge: Option<u8>,
    /// Reply transform the transmitter firmware uses
    pub reply_transform: ReplyTransform,
    /// Use simulated transmitters instead of serial hardware
    pub simulate: bool,
    /// Simulated transmitters used when `simulate` is set
    pub simulated_ports: Vec<SimEndpointConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        let defaults = PortSettings::default();
        Self {
            baud_rate: defaults.baud_rate,
            timeout_ms: defaults.timeout.as_millis() as u64,
            settle_ms: defaults.settle_delay.as_millis() as u64,
            channel_upper_bound: DEFAULT_CHANNEL_UPPER_BOUND,
            discovery: Discovery::default(),
            scanner: ScannerConfig::default(),
            challenge: None,
            reply_transform: ReplyTransform::default(),
            simulate: false,
            simulated_ports: vec![
                SimEndpointConfig::new("SIM1", SimBehavior::Echo),
                SimEndpointConfig::new("SIM2", SimBehavior::Silent),
                SimEndpointConfig::new("SIM3", SimBehavior::Constant(b'x')),
            ],
        }
    }
}

impl Settings {
    /// Get the XDG config directory for lifilink
    /// Uses $XDG_CONFIG_HOME/lifilink, falls back to ~/.config/lifilink
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("lifilink"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("lifilink"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::settings_path()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<(), String> {
        let path =
            Self::settings_path().ok_or_else(|| "Could not determine settings path".to_string())?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create settings directory: {}", e))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        std::fs::write(&path, json).map_err(|e| format!("Failed to write settings: {}", e))?;

        Ok(())
    }

    /// Port parameters for the mass client
    pub fn port_settings(&self) -> PortSettings {
        PortSettings::new(self.baud_rate, Duration::from_millis(self.timeout_ms))
            .with_settle_delay(Duration::from_millis(self.settle_ms))
    }

    /// Protocol parameters for the transmitter link
    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            channel_upper_bound: self.channel_upper_bound,
            transform: self.reply_transform,
            challenge: self.challenge.map_or(Challenge::Random, Challenge::Fixed),
        }
    }

    /// Driver for serial hardware, filtered by the scanner settings
    pub fn serial_driver(&self) -> SerialDriver {
        SerialDriver::with_scanner(PortScanner::with_config(self.scanner.clone()))
    }

    /// Driver for the configured simulated transmitters
    pub fn sim_driver(&self) -> SimDriver {
        SimDriver::from_configs(self.simulated_ports.iter().cloned())
    }
}
