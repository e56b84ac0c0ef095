//! Audio streaming collaborator

use tracing::info;

/// Audio stream that carries the transmission once a channel is confirmed
pub trait AudioLink {
    fn start(&mut self);
    fn stop(&mut self);
    /// Release the audio device
    fn close(&mut self);
    fn is_streaming(&self) -> bool;
}

/// Audio link without a device binding that logs each transition
#[derive(Debug, Default)]
pub struct LoggingAudio {
    streaming: bool,
}

impl LoggingAudio {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioLink for LoggingAudio {
    fn start(&mut self) {
        if !self.streaming {
            info!("Audio stream started");
            self.streaming = true;
        }
    }

    fn stop(&mut self) {
        if self.streaming {
            info!("Audio stream stopped");
            self.streaming = false;
        }
    }

    fn close(&mut self) {
        self.stop();
        info!("Audio closed");
    }

    fn is_streaming(&self) -> bool {
        self.streaming
    }
}
