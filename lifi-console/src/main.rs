//! LiFi Link Console
//!
//! Finds the LiFi transmitters attached over serial, verifies them with a
//! challenge-response handshake, and sends channel selections typed at the
//! terminal.

mod audio;
mod commands;
mod console;
mod settings;

use anyhow::Context;
use audio::LoggingAudio;
use console::Console;
use lifi_link::ChannelTransmitter;
use lifi_mass::MassClient;
use lifi_port::PortDriver;
use settings::Settings;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Include all our crates in the default filter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "lifilink=info,lifi_port=info,lifi_mass=info,lifi_link=info,lifi_sim=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LiFi Link");

    let settings = Settings::load();
    if let Some(path) = Settings::settings_path().filter(|p| !p.exists()) {
        match settings.save() {
            Ok(()) => tracing::info!("Wrote default settings to {}", path.display()),
            Err(e) => tracing::warn!("{}", e),
        }
    }

    if settings.simulate {
        tracing::info!(
            "Using {} simulated transmitter(s)",
            settings.simulated_ports.len()
        );
        run(settings.sim_driver(), &settings).await
    } else {
        run(settings.serial_driver(), &settings).await
    }
}

async fn run<D: PortDriver>(driver: D, settings: &Settings) -> anyhow::Result<()> {
    let client =
        MassClient::new(driver, settings.port_settings()).with_discovery(settings.discovery.clone());
    let link = ChannelTransmitter::new(client, settings.link_config());
    let mut console = Console::new(link, LoggingAudio::new(), std::io::stdout());

    console
        .handle(commands::Command::Help)
        .await
        .context("Failed to write to terminal")?;
    console
        .refresh()
        .await
        .context("Failed to write to terminal")?;

    let stdin = BufReader::new(tokio::io::stdin());
    console.run(stdin).await.context("Console input failed")?;

    tracing::info!("Goodbye");
    Ok(())
}
