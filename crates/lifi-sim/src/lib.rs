//! LiFi Transmitter Simulation Library
//!
//! This crate provides in-process transmitter endpoints for exercising the
//! mass client and the verification protocol without physical hardware:
//!
//! - **SimBehavior**: how an endpoint answers each byte it receives
//! - **SimDriver**: a [`PortDriver`](lifi_port::PortDriver) whose ports are
//!   `tokio::io::duplex` pairs wired to a simulated transmitter task
//!
//! # Example
//!
//! ```rust
//! use lifi_port::{PortDriver, PortSettings};
//! use lifi_sim::{SimBehavior, SimDriver};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let driver = SimDriver::new()
//!     .with_endpoint("SIM1", SimBehavior::Echo)
//!     .with_endpoint("SIM2", SimBehavior::Silent);
//!
//! let mut port = driver.open("SIM1", &PortSettings::default()).unwrap();
//! port.write(b"e").await.unwrap();
//! assert_eq!(port.read(1).await.unwrap(), b"e");
//! # }
//! ```

pub mod driver;
pub mod transmitter;

pub use driver::{SimDriver, SimEndpointConfig, SimOpenError};
pub use transmitter::{run_sim_transmitter, SimBehavior, SimRecord};
