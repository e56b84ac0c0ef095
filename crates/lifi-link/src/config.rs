//! Link configuration

use serde::{Deserialize, Serialize};

use crate::challenge::Challenge;
use crate::channel::DEFAULT_CHANNEL_UPPER_BOUND;
use crate::transform::ReplyTransform;

/// Protocol parameters fixed for the lifetime of a transmitter link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Highest selectable channel
    pub channel_upper_bound: u32,
    /// Reply transform agreed with the firmware
    #[serde(default)]
    pub transform: ReplyTransform,
    /// Challenge byte source
    #[serde(default)]
    pub challenge: Challenge,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            channel_upper_bound: DEFAULT_CHANNEL_UPPER_BOUND,
            transform: ReplyTransform::default(),
            challenge: Challenge::default(),
        }
    }
}
