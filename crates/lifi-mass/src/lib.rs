//! LiFi Mass Client
//!
//! This crate fans port operations out across an arbitrary set of ports and
//! fans the results back in, keyed by port name.
//!
//! # Architecture
//!
//! - [`PortRegistry`] is the single owner of every open port
//! - [`fan_out`] runs one task per item and joins them all before returning
//! - [`MassClient`] composes the two into `mass_open`, `mass_close`,
//!   `mass_read` and `mass_write`
//!
//! During a batch the affected ports are moved out of the registry into
//! their tasks and moved back by the calling context after the join, so the
//! registry never has concurrent writers.
//!
//! # Example
//!
//! ```rust,no_run
//! use lifi_mass::MassClient;
//! use lifi_port::{PortSettings, SerialDriver};
//!
//! # async fn demo() -> Result<(), lifi_mass::MassError> {
//! let mut client = MassClient::new(SerialDriver::new(), PortSettings::default());
//! client.mass_open(None).await;
//!
//! let writes = client.mass_write(b"e", None).await?;
//! for (port, outcome) in writes.iter() {
//!     println!("{port}: {outcome:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod client;
pub mod error;
pub mod executor;
pub mod registry;

pub use batch::BatchResult;
pub use client::MassClient;
pub use error::MassError;
pub use executor::fan_out;
pub use registry::PortRegistry;
