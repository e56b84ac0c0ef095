//! Line-oriented command dispatcher

use std::io::{self, Write};
use std::ops::ControlFlow;

use lifi_link::ChannelTransmitter;
use lifi_port::PortDriver;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::audio::AudioLink;
use crate::commands::{Command, HELP};

/// Terminal bell, rung three times when a transmission fails
const BELL: &str = "\x07";

/// Owns the transmitter link and the audio stream, and applies user commands
/// to them one at a time
pub struct Console<D: PortDriver, A: AudioLink, W: Write> {
    link: ChannelTransmitter<D>,
    audio: A,
    out: W,
}

impl<D: PortDriver, A: AudioLink, W: Write> Console<D, A, W> {
    pub fn new(link: ChannelTransmitter<D>, audio: A, out: W) -> Self {
        Self { link, audio, out }
    }

    pub fn link(&self) -> &ChannelTransmitter<D> {
        &self.link
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Dispatch commands from `input` until quit or end of input, then shut down
    pub async fn run<R>(&mut self, input: R) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let Some(command) = Command::parse(&line) else {
                continue;
            };
            debug!("Command: {:?}", command);
            if self.handle(command).await?.is_break() {
                break;
            }
        }
        self.shutdown().await;
        Ok(())
    }

    /// Apply one command
    pub async fn handle(&mut self, command: Command) -> io::Result<ControlFlow<()>> {
        match command {
            Command::SelectChannel(value) => match self.link.select_channel(value) {
                Ok(channel) => writeln!(self.out, "Channel {}", channel)?,
                Err(e) => writeln!(self.out, "{}", e)?,
            },
            Command::BeginTransmit => self.begin_transmit().await?,
            Command::EndTransmit => {
                self.audio.stop();
                writeln!(self.out, "Transmission stopped")?;
            }
            Command::Refresh => self.refresh().await?,
            Command::ListPorts => self.list_ports()?,
            Command::Help => writeln!(self.out, "{}", HELP)?,
            Command::Quit => return Ok(ControlFlow::Break(())),
            Command::Unknown(input) => {
                writeln!(self.out, "Unknown command '{}', press h for help", input)?
            }
        }
        self.out.flush()?;
        Ok(ControlFlow::Continue(()))
    }

    /// Rediscover transmitters and print the result
    pub async fn refresh(&mut self) -> io::Result<()> {
        writeln!(self.out, "Refreshing transmitters...")?;
        let report = self.link.refresh().await;
        if report.is_empty() {
            writeln!(self.out, "No valid transmitters found")?;
        } else {
            writeln!(
                self.out,
                "Found {} transmitter(s): {}",
                report.trusted.len(),
                report.trusted.join(", ")
            )?;
        }
        self.out.flush()
    }

    /// Release the audio device and close every port
    pub async fn shutdown(&mut self) {
        self.audio.close();
        self.link.shutdown().await;
    }

    async fn begin_transmit(&mut self) -> io::Result<()> {
        let report = self.link.transmit().await;
        if report.success() {
            self.audio.start();
            writeln!(
                self.out,
                "Transmitting channel {} on {}",
                report.channel,
                report.trusted.join(", ")
            )
        } else {
            self.audio.stop();
            writeln!(
                self.out,
                "Transmission failed, no transmitter confirmed channel {}",
                report.channel
            )?;
            write!(self.out, "{}", BELL.repeat(3))
        }
    }

    fn list_ports(&mut self) -> io::Result<()> {
        let ports = self.link.transmitters();
        if ports.is_empty() {
            return writeln!(self.out, "No transmitters");
        }
        for port in ports {
            writeln!(self.out, "{}", port)?;
        }
        Ok(())
    }
}
