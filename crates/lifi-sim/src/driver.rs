//! Simulated port driver

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use lifi_port::{Port, PortDriver, PortError, PortSettings};
use serde::{Deserialize, Serialize};
use tokio::io::DuplexStream;
use tracing::debug;

use crate::transmitter::{lock, run_sim_transmitter, SimBehavior, SimRecord};

/// Buffer size of each simulated link
const DUPLEX_CAPACITY: usize = 1024;

/// Scripted open failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimOpenError {
    /// Held by another process
    Busy,
    /// Access refused
    Denied,
}

/// Configuration for one simulated endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimEndpointConfig {
    /// Name the endpoint is opened by
    pub name: String,
    /// Reply behaviour
    #[serde(default)]
    pub behavior: SimBehavior,
    /// Name reported by the opened handle, if different
    #[serde(default)]
    pub canonical_name: Option<String>,
    /// Fail every open with this error
    #[serde(default)]
    pub open_error: Option<SimOpenError>,
}

impl SimEndpointConfig {
    /// Endpoint with the given behaviour
    pub fn new(name: impl Into<String>, behavior: SimBehavior) -> Self {
        Self {
            name: name.into(),
            behavior,
            canonical_name: None,
            open_error: None,
        }
    }
}

struct SimEndpoint {
    config: SimEndpointConfig,
    record: Arc<Mutex<SimRecord>>,
}

/// Driver whose ports are simulated transmitters
///
/// Names that were never configured fail to open with
/// [`PortError::NotFound`], like an absent device.
pub struct SimDriver {
    endpoints: BTreeMap<String, SimEndpoint>,
    enumerable: bool,
}

impl SimDriver {
    /// Driver with no endpoints that supports enumeration
    pub fn new() -> Self {
        Self {
            endpoints: BTreeMap::new(),
            enumerable: true,
        }
    }

    /// Driver built from endpoint configurations
    pub fn from_configs(configs: impl IntoIterator<Item = SimEndpointConfig>) -> Self {
        let mut driver = Self::new();
        for config in configs {
            driver.add(config);
        }
        driver
    }

    /// Add an endpoint with the given behaviour
    pub fn with_endpoint(mut self, name: impl Into<String>, behavior: SimBehavior) -> Self {
        self.add(SimEndpointConfig::new(name, behavior));
        self
    }

    /// Toggle enumeration support, forcing callers onto probing when off
    pub fn with_enumeration(mut self, enumerable: bool) -> Self {
        self.enumerable = enumerable;
        self
    }

    /// Add or replace an endpoint
    pub fn add(&mut self, config: SimEndpointConfig) {
        let record = SimRecord {
            behavior: config.behavior,
            ..SimRecord::default()
        };
        self.endpoints.insert(
            config.name.clone(),
            SimEndpoint {
                config,
                record: Arc::new(Mutex::new(record)),
            },
        );
    }

    /// Change how an endpoint replies, effective for the next byte
    pub fn set_behavior(&self, name: &str, behavior: SimBehavior) {
        if let Some(endpoint) = self.endpoints.get(name) {
            lock(&endpoint.record).behavior = behavior;
        }
    }

    /// Snapshot of what an endpoint has seen
    pub fn record(&self, name: &str) -> Option<SimRecord> {
        self.endpoints
            .get(name)
            .map(|endpoint| lock(&endpoint.record).clone())
    }

    /// Bytes an endpoint has received
    pub fn received(&self, name: &str) -> Vec<u8> {
        self.record(name).map(|r| r.received).unwrap_or_default()
    }

    /// Channels an endpoint has broadcast
    pub fn channels(&self, name: &str) -> Vec<u8> {
        self.record(name).map(|r| r.channels).unwrap_or_default()
    }
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PortDriver for SimDriver {
    type Stream = DuplexStream;

    /// Must be called from within a tokio runtime
    fn open(&self, name: &str, settings: &PortSettings) -> Result<Port<DuplexStream>, PortError> {
        let endpoint = self
            .endpoints
            .get(name)
            .ok_or_else(|| PortError::NotFound(name.to_string()))?;

        match endpoint.config.open_error {
            Some(SimOpenError::Busy) => return Err(PortError::Busy(name.to_string())),
            Some(SimOpenError::Denied) => return Err(PortError::PermissionDenied(name.to_string())),
            None => {}
        }

        let (client, device) = tokio::io::duplex(DUPLEX_CAPACITY);
        lock(&endpoint.record).opens += 1;
        tokio::spawn(run_sim_transmitter(
            device,
            name.to_string(),
            endpoint.record.clone(),
        ));

        let canonical = endpoint
            .config
            .canonical_name
            .clone()
            .unwrap_or_else(|| name.to_string());
        debug!("Opened simulated endpoint {} as {}", name, canonical);
        Ok(Port::new(canonical, client, settings))
    }

    fn enumerate(&self) -> Option<Vec<String>> {
        self.enumerable
            .then(|| self.endpoints.keys().cloned().collect())
    }
}
