//! Challenge byte selection

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Printable bytes above `'9'`, so a challenge is never taken for a channel
pub const CHALLENGE_RANGE: RangeInclusive<u8> = b':'..=b'~';

/// Source of the challenge byte for a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "byte", rename_all = "snake_case")]
pub enum Challenge {
    /// Drawn fresh for every refresh from [`CHALLENGE_RANGE`]
    #[default]
    Random,
    /// Always the same sentinel byte
    Fixed(u8),
}

impl Challenge {
    /// Byte to use for one refresh
    pub fn draw(&self) -> u8 {
        match self {
            Challenge::Random => rand::thread_rng().gen_range(CHALLENGE_RANGE),
            Challenge::Fixed(byte) => *byte,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_stays_in_range() {
        for _ in 0..500 {
            let byte = Challenge::Random.draw();
            assert!(CHALLENGE_RANGE.contains(&byte));
            assert!(!byte.is_ascii_digit());
        }
    }

    #[test]
    fn test_fixed_sentinel() {
        assert_eq!(Challenge::Fixed(b'e').draw(), b'e');
    }
}
