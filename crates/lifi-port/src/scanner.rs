//! OS serial port enumeration
//!
//! Lists the serial ports the OS knows about and keeps the ones that could be
//! transmitter boards: names matching a skip pattern are dropped, and when a
//! USB allow-list is configured only boards with a listed vendor/product ID
//! are kept.

use std::fmt;

use serde::{Deserialize, Serialize};
use serialport::{available_ports, SerialPortType};
use tracing::{debug, info};

use crate::error::PortError;

/// USB vendor/product ID pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsbId {
    pub vid: u16,
    pub pid: u16,
}

impl fmt::Display for UsbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vid, self.pid)
    }
}

/// An OS-visible serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortInfo {
    /// Port name (e.g., /dev/ttyUSB0, COM3)
    pub port: String,
    /// Set for USB serial adapters
    pub usb: Option<UsbId>,
    /// USB product string
    pub product: Option<String>,
}

impl From<serialport::SerialPortInfo> for SerialPortInfo {
    fn from(info: serialport::SerialPortInfo) -> Self {
        let (usb, product) = match info.port_type {
            SerialPortType::UsbPort(usb) => (
                Some(UsbId {
                    vid: usb.vid,
                    pid: usb.pid,
                }),
                usb.product,
            ),
            _ => (None, None),
        };
        Self {
            port: info.port_name,
            usb,
            product,
        }
    }
}

impl SerialPortInfo {
    /// Name followed by whatever USB identity is known
    pub fn label(&self) -> String {
        match (&self.product, self.usb) {
            (Some(product), Some(id)) => format!("{} ({}, {})", self.port, product, id),
            (None, Some(id)) => format!("{} ({})", self.port, id),
            _ => self.port.clone(),
        }
    }
}

/// Which enumerated ports count as candidates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Drop ports whose name contains any of these
    pub skip_patterns: Vec<String>,
    /// Keep only USB boards with one of these IDs; empty keeps everything
    pub usb_ids: Vec<UsbId>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            // macOS Bluetooth and debug console ports are never transmitters
            skip_patterns: vec!["Bluetooth".to_string(), "debug".to_string()],
            usb_ids: Vec::new(),
        }
    }
}

impl ScannerConfig {
    /// Whether `info` is a transmitter candidate
    pub fn accepts(&self, info: &SerialPortInfo) -> bool {
        if self
            .skip_patterns
            .iter()
            .any(|pattern| info.port.contains(pattern.as_str()))
        {
            return false;
        }
        self.usb_ids.is_empty() || info.usb.is_some_and(|id| self.usb_ids.contains(&id))
    }
}

/// Serial port scanner
#[derive(Debug, Clone, Default)]
pub struct PortScanner {
    config: ScannerConfig,
}

impl PortScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// List the candidate ports
    pub fn enumerate_ports(&self) -> Result<Vec<SerialPortInfo>, PortError> {
        let ports = available_ports().map_err(|e| PortError::EnumerationFailed(e.to_string()))?;
        Ok(self.filter(ports.into_iter().map(SerialPortInfo::from)))
    }

    fn filter(&self, ports: impl IntoIterator<Item = SerialPortInfo>) -> Vec<SerialPortInfo> {
        let (kept, skipped): (Vec<_>, Vec<_>) =
            ports.into_iter().partition(|p| self.config.accepts(p));

        for port in &skipped {
            debug!("Skipping {}", port.label());
        }
        if kept.is_empty() {
            info!("No candidate serial ports found");
        }
        for port in &kept {
            info!("Found {}", port.label());
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use serialport::UsbPortInfo;

    use super::*;

    const ARDUINO_UNO: UsbId = UsbId {
        vid: 0x2341,
        pid: 0x0043,
    };

    fn usb(port: &str, id: UsbId) -> SerialPortInfo {
        SerialPortInfo {
            port: port.to_string(),
            usb: Some(id),
            product: None,
        }
    }

    fn plain(port: &str) -> SerialPortInfo {
        SerialPortInfo {
            port: port.to_string(),
            usb: None,
            product: None,
        }
    }

    #[test]
    fn test_from_usb_port() {
        let info = SerialPortInfo::from(serialport::SerialPortInfo {
            port_name: "/dev/ttyACM0".to_string(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid: 0x2341,
                pid: 0x0043,
                serial_number: None,
                manufacturer: Some("Arduino LLC".to_string()),
                product: Some("Arduino Uno".to_string()),
            }),
        });

        assert_eq!(info.usb, Some(ARDUINO_UNO));
        assert_eq!(info.label(), "/dev/ttyACM0 (Arduino Uno, 2341:0043)");
    }

    #[test]
    fn test_label_without_usb() {
        assert_eq!(plain("COM1").label(), "COM1");
        assert_eq!(usb("COM3", ARDUINO_UNO).label(), "COM3 (2341:0043)");
    }

    #[test]
    fn test_skip_patterns() {
        let config = ScannerConfig::default();
        assert!(!config.accepts(&plain("/dev/cu.Bluetooth-Incoming-Port")));
        assert!(config.accepts(&plain("/dev/cu.usbmodem1101")));

        let config = ScannerConfig {
            skip_patterns: Vec::new(),
            ..Default::default()
        };
        assert!(config.accepts(&plain("/dev/cu.Bluetooth-Incoming-Port")));
    }

    #[test]
    fn test_usb_allow_list() {
        let scanner = PortScanner::with_config(ScannerConfig {
            usb_ids: vec![ARDUINO_UNO],
            ..Default::default()
        });

        let kept = scanner.filter(vec![
            usb("COM3", ARDUINO_UNO),
            usb("COM4", UsbId { vid: 0x10c4, pid: 0xea60 }),
            plain("COM1"),
        ]);

        assert_eq!(kept, vec![usb("COM3", ARDUINO_UNO)]);
    }

    #[test]
    fn test_config_serde() {
        let config: ScannerConfig =
            serde_json::from_str(r#"{ "usb_ids": [{ "vid": 9025, "pid": 67 }] }"#).unwrap();
        assert_eq!(config.usb_ids, vec![ARDUINO_UNO]);
        assert_eq!(config.skip_patterns, ScannerConfig::default().skip_patterns);
    }
}
