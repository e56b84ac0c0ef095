//! Expected reply computation

use serde::{Deserialize, Serialize};

/// Mask used by the XOR firmware revision (ASCII `'1'`)
pub const ALTERNATE_XOR_MASK: u8 = 0x31;

/// The transform agreed with the shipping firmware, which echoes every byte
pub const PROTOCOL_TRANSFORM: ReplyTransform = ReplyTransform::Echo;

/// Deterministic transform from a sent message to its expected reply byte
///
/// Both sides must agree on it; it is fixed when the link is built and never
/// chosen per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "mask", rename_all = "snake_case")]
pub enum ReplyTransform {
    /// Reply equals the first byte sent
    Echo,
    /// Reply equals the first byte sent XOR the mask
    Xor(u8),
}

impl ReplyTransform {
    /// Expected reply to `message`, `None` for an empty message
    pub fn expected(&self, message: &[u8]) -> Option<u8> {
        let first = *message.first()?;
        Some(match self {
            ReplyTransform::Echo => first,
            ReplyTransform::Xor(mask) => first ^ mask,
        })
    }

    /// Whether `reply` is exactly the expected single byte
    pub fn matches(&self, message: &[u8], reply: &[u8]) -> bool {
        match (self.expected(message), reply) {
            (Some(expected), [actual]) => expected == *actual,
            _ => false,
        }
    }
}

impl Default for ReplyTransform {
    fn default() -> Self {
        PROTOCOL_TRANSFORM
    }
}
