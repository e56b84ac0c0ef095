//! Simulated transmitter task
//!
//! Mirrors the transmitter firmware: every received byte is answered
//! according to the endpoint's behaviour, and digits are "broadcast" as
//! channel selections.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

/// How a simulated endpoint answers each received byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SimBehavior {
    /// Write every byte back unchanged (the shipping firmware)
    #[default]
    Echo,
    /// Write back every byte XORed with a mask
    Xor(u8),
    /// Never reply
    Silent,
    /// Always reply with the same byte
    Constant(u8),
    /// Echo non-digits, answer channel digits with `?`
    RejectChannels,
}

impl SimBehavior {
    /// Reply to one received byte, if any
    pub fn reply(&self, byte: u8) -> Option<u8> {
        match self {
            SimBehavior::Echo => Some(byte),
            SimBehavior::Xor(mask) => Some(byte ^ mask),
            SimBehavior::Silent => None,
            SimBehavior::Constant(reply) => Some(*reply),
            SimBehavior::RejectChannels if byte.is_ascii_digit() => Some(b'?'),
            SimBehavior::RejectChannels => Some(byte),
        }
    }
}

/// What a simulated endpoint has seen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimRecord {
    /// Current behaviour, read for every byte
    pub behavior: SimBehavior,
    /// Every byte received, across all opens
    pub received: Vec<u8>,
    /// Channel digits broadcast, as numeric values
    pub channels: Vec<u8>,
    /// Successful opens
    pub opens: usize,
}

pub(crate) fn lock(record: &Mutex<SimRecord>) -> std::sync::MutexGuard<'_, SimRecord> {
    record.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run a simulated transmitter on `stream` until the peer closes it
pub async fn run_sim_transmitter<S>(
    mut stream: S,
    name: String,
    record: Arc<Mutex<SimRecord>>,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = [0u8; 64];
    debug!("Simulated transmitter {} online", name);

    loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                debug!("Simulated transmitter {} stream error: {}", name, e);
                return Err(e);
            }
        };

        let replies: Vec<u8> = {
            let mut record = lock(&record);
            let behavior = record.behavior;
            buf[..n]
                .iter()
                .filter_map(|&byte| {
                    record.received.push(byte);
                    if byte.is_ascii_digit() {
                        record.channels.push(byte - b'0');
                    }
                    behavior.reply(byte)
                })
                .collect()
        };
        trace!("{} received {:02X?}, replying {:02X?}", name, &buf[..n], replies);

        if !replies.is_empty() {
            stream.write_all(&replies).await?;
            stream.flush().await?;
        }
    }

    debug!("Simulated transmitter {} offline", name);
    Ok(())
}
