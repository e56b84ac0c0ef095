//! LiFi Transmitter Link
//!
//! This crate decides which open ports are genuine transmitters and sends
//! channel selections to them.
//!
//! # Protocol
//!
//! - **refresh**: open every discoverable port, write one challenge byte to
//!   each, read one byte back, and keep only the ports whose reply matches
//!   the protocol transform of the challenge
//! - **transmit**: write the current channel as decimal text to every trusted
//!   port and read one confirmation byte back; ports that fail are dropped
//!   until the next refresh
//!
//! The reply transform is a protocol constant agreed with the firmware:
//! [`PROTOCOL_TRANSFORM`] is an exact echo.
//!
//! # Example
//!
//! ```rust,no_run
//! use lifi_link::{ChannelTransmitter, LinkConfig};
//! use lifi_mass::MassClient;
//! use lifi_port::{PortSettings, SerialDriver};
//!
//! # async fn demo() {
//! let client = MassClient::new(SerialDriver::new(), PortSettings::default());
//! let mut link = ChannelTransmitter::new(client, LinkConfig::default());
//!
//! let refreshed = link.refresh().await;
//! if !refreshed.is_empty() {
//!     link.select_channel(3).unwrap();
//!     let sent = link.transmit().await;
//!     println!("transmitted: {}", sent.success());
//! }
//! # }
//! ```

pub mod challenge;
pub mod channel;
pub mod config;
pub mod report;
pub mod transform;
pub mod transmitter;

pub use challenge::{Challenge, CHALLENGE_RANGE};
pub use channel::{ChannelError, ChannelState, DEFAULT_CHANNEL_UPPER_BOUND};
pub use config::LinkConfig;
pub use report::{LinkFailure, Phase, RefreshReport, TransmitReport};
pub use transform::{ReplyTransform, ALTERNATE_XOR_MASK, PROTOCOL_TRANSFORM};
pub use transmitter::ChannelTransmitter;
