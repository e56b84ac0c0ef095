//! Currently selected transmission channel

use thiserror::Error;

/// Highest channel the receivers decode
pub const DEFAULT_CHANNEL_UPPER_BOUND: u32 = 9;

/// Errors from channel selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// Requested channel is outside `0..=upper_bound`
    #[error("channel must be between 0 and {upper_bound}, got {requested}")]
    OutOfRange { requested: i64, upper_bound: u32 },
}

/// Bounded channel selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelState {
    channel: u32,
    upper_bound: u32,
}

impl ChannelState {
    /// Channel 0 with the given inclusive upper bound
    pub fn new(upper_bound: u32) -> Self {
        Self {
            channel: 0,
            upper_bound,
        }
    }

    /// Selected channel
    pub fn current(&self) -> u32 {
        self.channel
    }

    /// Inclusive upper bound
    pub fn upper_bound(&self) -> u32 {
        self.upper_bound
    }

    /// Select a channel; out-of-range values leave the state unchanged
    pub fn select(&mut self, value: i64) -> Result<u32, ChannelError> {
        match u32::try_from(value) {
            Ok(channel) if channel <= self.upper_bound => {
                self.channel = channel;
                Ok(channel)
            }
            _ => Err(ChannelError::OutOfRange {
                requested: value,
                upper_bound: self.upper_bound,
            }),
        }
    }

    /// Wire encoding: shortest decimal text
    pub fn encode(&self) -> Vec<u8> {
        self.channel.to_string().into_bytes()
    }
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_UPPER_BOUND)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_select_over_bound_is_rejected() {
        let mut state = ChannelState::new(9);
        state.select(4).unwrap();

        let err = state.select(12).unwrap_err();
        assert_eq!(
            err,
            ChannelError::OutOfRange {
                requested: 12,
                upper_bound: 9
            }
        );
        assert_eq!(state.current(), 4);

        assert_eq!(state.select(9), Ok(9));
        assert_eq!(state.current(), 9);
    }

    #[test]
    fn test_negative_is_rejected() {
        let mut state = ChannelState::default();
        assert!(state.select(-1).is_err());
        assert_eq!(state.current(), 0);
    }

    #[test]
    fn test_encode_is_decimal_text() {
        let mut state = ChannelState::new(20);
        assert_eq!(state.encode(), b"0");
        state.select(17).unwrap();
        assert_eq!(state.encode(), b"17");
    }

    proptest! {
        #[test]
        fn selection_respects_bound(bound in 0u32..100, value in -50i64..200) {
            let mut state = ChannelState::new(bound);
            let before = state.current();
            match state.select(value) {
                Ok(channel) => {
                    prop_assert!(value >= 0 && value <= bound as i64);
                    prop_assert_eq!(channel as i64, value);
                    prop_assert_eq!(state.current(), channel);
                }
                Err(_) => prop_assert_eq!(state.current(), before),
            }
        }
    }
}
