//! Transmitter verification and channel transmission

use lifi_mass::MassClient;
use lifi_port::PortDriver;
use tracing::{debug, info, warn};

use crate::challenge::Challenge;
use crate::channel::{ChannelError, ChannelState};
use crate::config::LinkConfig;
use crate::report::{LinkFailure, Phase, RefreshReport, TransmitReport};
use crate::transform::ReplyTransform;

/// Keeps the set of verified transmitters and sends channels to them
///
/// After a refresh, the ports left open in the client are exactly the trusted
/// transmitters. Transmit only ever shrinks that set.
pub struct ChannelTransmitter<D: PortDriver> {
    client: MassClient<D>,
    channel: ChannelState,
    transform: ReplyTransform,
    challenge: Challenge,
    phase: Phase,
}

impl<D: PortDriver> ChannelTransmitter<D> {
    pub fn new(client: MassClient<D>, config: LinkConfig) -> Self {
        Self {
            client,
            channel: ChannelState::new(config.channel_upper_bound),
            transform: config.transform,
            challenge: config.challenge,
            phase: Phase::default(),
        }
    }

    /// Select the channel for the next transmit
    pub fn select_channel(&mut self, value: i64) -> Result<u32, ChannelError> {
        self.channel.select(value)
    }

    pub fn channel(&self) -> u32 {
        self.channel.current()
    }

    pub fn channel_state(&self) -> &ChannelState {
        &self.channel
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn transform(&self) -> ReplyTransform {
        self.transform
    }

    /// Sorted names of the trusted transmitters
    pub fn transmitters(&self) -> Vec<String> {
        self.client.port_names()
    }

    pub fn client(&self) -> &MassClient<D> {
        &self.client
    }

    /// Rediscover and verify transmitters from scratch
    pub async fn refresh(&mut self) -> RefreshReport {
        self.enter(Phase::Discovering);
        self.client.mass_open(None).await;
        let candidates = self.client.port_names();
        info!("Found {} candidate port(s)", candidates.len());

        let challenge = self.challenge.draw();
        let message = [challenge];
        let mut rejected = Vec::new();

        self.enter(Phase::Challenging);
        debug!("Challenge byte {:#04x}", challenge);
        let delivered = self.send(&message, &mut rejected).await;

        self.enter(Phase::Confirming);
        self.confirm(&message, &delivered, &mut rejected).await;
        for (name, reason) in &rejected {
            debug!("Rejected {}: {}", name, reason);
        }
        self.prune(&rejected).await;

        self.enter(Phase::Settled);
        let trusted = self.client.port_names();
        if trusted.is_empty() {
            warn!("No valid transmitters found");
        } else {
            info!("Verified transmitter(s): {}", trusted.join(", "));
        }

        RefreshReport {
            challenge,
            candidates,
            rejected,
            trusted,
        }
    }

    /// Send the selected channel to every trusted transmitter
    ///
    /// Transmitters that fail to confirm are closed and stay out until the
    /// next refresh.
    pub async fn transmit(&mut self) -> TransmitReport {
        let channel = self.channel.current();
        let attempted = self.client.port_names();
        if attempted.is_empty() {
            warn!("No transmitters to send channel {} to", channel);
            return TransmitReport {
                channel,
                attempted,
                ..Default::default()
            };
        }

        let message = self.channel.encode();
        let mut failures = Vec::new();
        let delivered = self.send(&message, &mut failures).await;
        self.confirm(&message, &delivered, &mut failures).await;
        for (name, reason) in &failures {
            warn!("Dropping transmitter {}: {}", name, reason);
        }
        self.prune(&failures).await;

        let trusted = self.client.port_names();
        if trusted.is_empty() {
            warn!("Channel {} was not confirmed by any transmitter", channel);
        } else {
            info!(
                "Transmitting channel {} on {} transmitter(s)",
                channel,
                trusted.len()
            );
        }

        TransmitReport {
            channel,
            attempted,
            failures,
            trusted,
        }
    }

    /// Close every open port
    pub async fn shutdown(&mut self) {
        self.client.mass_close(None).await;
    }

    fn enter(&mut self, phase: Phase) {
        debug!("Refresh phase: {}", phase);
        self.phase = phase;
    }

    /// Write `message` to every open port, returning the ports that took all of it
    ///
    /// Replies left over from an earlier message (the echo of every byte
    /// after the first) are discarded first, so the next read sees only the
    /// reply to this one.
    async fn send(
        &mut self,
        message: &[u8],
        failures: &mut Vec<(String, LinkFailure)>,
    ) -> Vec<String> {
        if let Ok(cleared) = self.client.mass_clear_input(None).await {
            for (name, outcome) in cleared.iter() {
                match outcome {
                    Ok(0) => {}
                    Ok(count) => debug!("Discarded {} stale byte(s) from {}", count, name),
                    Err(e) => debug!("{}", e),
                }
            }
        }

        let written = match self.client.mass_write(message, None).await {
            Ok(written) => written,
            Err(e) => {
                debug!("Nothing to write to: {}", e);
                return Vec::new();
            }
        };

        let mut delivered = Vec::with_capacity(written.len());
        for (name, outcome) in written {
            match outcome {
                Ok(count) if count == message.len() => delivered.push(name),
                Ok(count) => failures.push((
                    name,
                    LinkFailure::CountMismatch {
                        expected: message.len(),
                        actual: count,
                    },
                )),
                Err(e) => failures.push((name, LinkFailure::Write(e))),
            }
        }
        delivered
    }

    /// Read one reply byte from each delivered port and check it
    async fn confirm(
        &mut self,
        message: &[u8],
        delivered: &[String],
        failures: &mut Vec<(String, LinkFailure)>,
    ) {
        // An empty name list would select every open port
        if delivered.is_empty() {
            return;
        }
        let Some(expected) = self.transform.expected(message) else {
            return;
        };

        let replies = match self.client.mass_read(1, Some(delivered)).await {
            Ok(replies) => replies,
            Err(e) => {
                debug!("Nothing to read from: {}", e);
                return;
            }
        };

        for (name, outcome) in replies {
            match outcome {
                Ok(reply) if self.transform.matches(message, &reply) => {}
                Ok(reply) => failures.push((
                    name,
                    LinkFailure::Mismatch {
                        expected,
                        actual: reply,
                    },
                )),
                Err(e) => failures.push((name, LinkFailure::Read(e))),
            }
        }
    }

    async fn prune(&mut self, failures: &[(String, LinkFailure)]) {
        if failures.is_empty() {
            return;
        }
        let names: Vec<String> = failures.iter().map(|(name, _)| name.clone()).collect();
        self.client.mass_close(Some(&names)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use lifi_port::PortSettings;
    use lifi_sim::{SimBehavior, SimDriver};

    use super::*;

    fn link(driver: SimDriver) -> ChannelTransmitter<SimDriver> {
        let settings = PortSettings::new(9600, Duration::from_millis(50));
        ChannelTransmitter::new(MassClient::new(driver, settings), LinkConfig::default())
    }

    #[tokio::test]
    async fn test_refresh_settles() {
        let driver = SimDriver::new().with_endpoint("SIM1", SimBehavior::Echo);
        let mut link = link(driver);
        assert_eq!(link.phase(), Phase::Discovering);

        let report = link.refresh().await;
        assert_eq!(link.phase(), Phase::Settled);
        assert_eq!(report.trusted, vec!["SIM1"]);
        assert!(report.rejected.is_empty());
    }

    #[tokio::test]
    async fn test_transmit_without_transmitters_does_no_io() {
        let driver = SimDriver::new().with_endpoint("SIM1", SimBehavior::Echo);
        let mut link = link(driver);

        let report = link.transmit().await;
        assert!(!report.success());
        assert!(report.attempted.is_empty());
        assert_eq!(link.client().driver().record("SIM1").unwrap().opens, 0);
    }

    #[test]
    fn test_channel_selection_is_bounded() {
        let mut link = link(SimDriver::new());
        assert_eq!(link.select_channel(7), Ok(7));
        assert!(link.select_channel(10).is_err());
        assert_eq!(link.channel(), 7);
    }
}
