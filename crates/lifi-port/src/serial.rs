//! Hardware serial driver backed by tokio-serial

use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, warn};

use crate::driver::PortDriver;
use crate::error::PortError;
use crate::port::Port;
use crate::scanner::PortScanner;
use crate::settings::PortSettings;

/// Opens real serial ports
#[derive(Debug, Clone, Default)]
pub struct SerialDriver {
    scanner: PortScanner,
}

impl SerialDriver {
    /// Driver with the default scanner
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver with a custom scanner
    pub fn with_scanner(scanner: PortScanner) -> Self {
        Self { scanner }
    }

    pub fn scanner(&self) -> &PortScanner {
        &self.scanner
    }
}

impl PortDriver for SerialDriver {
    type Stream = SerialStream;

    fn open(&self, name: &str, settings: &PortSettings) -> Result<Port<SerialStream>, PortError> {
        debug!("Opening {} at {} baud", name, settings.baud_rate);

        let stream = tokio_serial::new(name, settings.baud_rate)
            .timeout(settings.timeout)
            .open_native_async()
            .map_err(|e| {
                debug!("Failed to open {}: {}", name, e);
                PortError::from_serial(name, &e)
            })?;

        // The driver may normalize the requested name
        let canonical = stream.name().unwrap_or_else(|| name.to_string());
        Ok(Port::new(canonical, stream, settings))
    }

    fn enumerate(&self) -> Option<Vec<String>> {
        match self.scanner.enumerate_ports() {
            Ok(ports) => Some(ports.into_iter().map(|p| p.port).collect()),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }
}
