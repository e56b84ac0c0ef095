//! LiFi Port Capability Library
//!
//! This crate provides the minimal operation set every transmitter endpoint
//! supports: open-by-name, close, bounded read and bounded write. Everything
//! above it (the mass client and the verification protocol) is written
//! against the [`PortDriver`] trait, so real serial hardware and simulated
//! endpoints are interchangeable.
//!
//! # Example
//!
//! ```rust,no_run
//! use lifi_port::{PortDriver, PortSettings, SerialDriver};
//!
//! # async fn demo() -> Result<(), lifi_port::PortError> {
//! let driver = SerialDriver::new();
//! let mut port = driver.open("/dev/ttyUSB0", &PortSettings::default())?;
//!
//! port.write(b"3").await?;
//! let reply = port.read(1).await?;
//! println!("{} replied {:02X?}", port.name(), reply);
//! port.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod discovery;
pub mod driver;
pub mod error;
pub mod port;
pub mod scanner;
pub mod serial;
pub mod settings;

pub use discovery::{Discovery, DiscoveryMode, ProbeScheme, MAX_PROBE_CANDIDATES};
pub use driver::PortDriver;
pub use error::PortError;
pub use port::Port;
pub use scanner::{PortScanner, ScannerConfig, SerialPortInfo, UsbId};
pub use serial::SerialDriver;
pub use settings::PortSettings;
