//! Mass client: batch open/close/read/write over the registry

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use lifi_port::{Discovery, Port, PortDriver, PortError, PortSettings};
use tracing::{debug, info, warn};

use crate::batch::BatchResult;
use crate::error::MassError;
use crate::executor::fan_out;
use crate::registry::PortRegistry;

/// Client that talks to many ports at once
///
/// Callers refer to ports by name; the client's registry is the only owner
/// of open port handles.
pub struct MassClient<D: PortDriver> {
    driver: Arc<D>,
    settings: PortSettings,
    discovery: Discovery,
    registry: PortRegistry<D::Stream>,
}

impl<D: PortDriver> MassClient<D> {
    /// Create a client using enumeration-with-probe-fallback discovery
    pub fn new(driver: D, settings: PortSettings) -> Self {
        Self {
            driver: Arc::new(driver),
            settings,
            discovery: Discovery::default(),
            registry: PortRegistry::new(),
        }
    }

    /// Replace the discovery strategy
    pub fn with_discovery(mut self, discovery: Discovery) -> Self {
        self.discovery = discovery;
        self
    }

    /// Settings applied to every opened port
    pub fn settings(&self) -> &PortSettings {
        &self.settings
    }

    /// The port provider
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Every open port
    pub fn ports(&self) -> &PortRegistry<D::Stream> {
        &self.registry
    }

    /// Sorted names of every open port
    pub fn port_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Look up an open port by name
    pub fn get_port(&self, name: &str) -> Option<&Port<D::Stream>> {
        self.registry.get(name)
    }

    /// Open a single port, closing any tracked port of the same name first
    ///
    /// Returns the canonical name the port is tracked under.
    pub async fn open(&mut self, name: &str) -> Result<String, PortError> {
        self.close(name).await;
        let port = open_port(self.driver.clone(), name.to_string(), self.settings).await?;
        let canonical = port.name().to_string();
        self.track(port).await;
        Ok(canonical)
    }

    /// Close a single port
    ///
    /// Returns `false` when the port was not open.
    pub async fn close(&mut self, name: &str) -> bool {
        match self.registry.remove(name) {
            Some(port) => {
                if let Err(e) = port.close().await {
                    debug!("{}", e);
                }
                info!("Closed {}", name);
                true
            }
            None => false,
        }
    }

    /// Read from a single open port
    pub async fn read(&mut self, name: &str, max_bytes: usize) -> Result<Vec<u8>, PortError> {
        let port = self
            .registry
            .get_mut(name)
            .ok_or_else(|| PortError::NotTracked(name.to_string()))?;
        port.read(max_bytes).await
    }

    /// Write to a single open port
    pub async fn write(&mut self, name: &str, payload: &[u8]) -> Result<usize, PortError> {
        let port = self
            .registry
            .get_mut(name)
            .ok_or_else(|| PortError::NotTracked(name.to_string()))?;
        port.write(payload).await
    }

    /// Open many ports concurrently
    ///
    /// With `None`, every tracked port is closed and the candidates come from
    /// discovery. With names, tracked ports among them are closed first so
    /// they are reopened cleanly. Candidates that fail to open are simply
    /// absent from the registry.
    ///
    /// The result is an open report, not the registry: it has one entry per
    /// candidate, keyed by the requested name. `Ok` holds the canonical name
    /// the port is now tracked under; an `Err` entry means the candidate is
    /// not tracked. Use [`ports`](Self::ports) or
    /// [`port_names`](Self::port_names) for the set of open ports.
    pub async fn mass_open(&mut self, names: Option<&[String]>) -> BatchResult<String> {
        let candidates = match names {
            None => {
                self.mass_close(None).await;
                dedup(&self.discovery.candidates(&*self.driver))
            }
            Some(names) => {
                let names = dedup(names);
                self.mass_close(Some(&names)).await;
                names
            }
        };

        if candidates.is_empty() {
            return BatchResult::new();
        }
        debug!("Opening {} candidate port(s)", candidates.len());

        let driver = self.driver.clone();
        let settings = self.settings;
        let items = candidates.into_iter().map(|n| (n.clone(), n)).collect();
        let opened = fan_out(items, move |name| open_port(driver.clone(), name, settings)).await;

        let mut results = BatchResult::with_capacity(opened.len());
        for (requested, outcome) in opened {
            match outcome.and_then(|r| r) {
                Ok(port) => {
                    let canonical = port.name().to_string();
                    if canonical != requested {
                        debug!("{} opened as {}", requested, canonical);
                    }
                    self.track(port).await;
                    results.push(requested, Ok(canonical));
                }
                Err(e) => {
                    debug!("{}", e);
                    results.push(requested, Err(e));
                }
            }
        }

        info!("{} port(s) open", self.registry.len());
        results
    }

    /// Close many ports concurrently
    ///
    /// With `None`, every tracked port is closed. Names that are not open are
    /// ignored.
    pub async fn mass_close(&mut self, names: Option<&[String]>) {
        let ports = match names {
            None => self.registry.drain(),
            Some(names) => names
                .iter()
                .filter_map(|name| self.registry.remove(name))
                .collect(),
        };
        if ports.is_empty() {
            return;
        }

        let items = ports
            .into_iter()
            .map(|port| (port.name().to_string(), port))
            .collect();
        let closed = fan_out(items, |port: Port<D::Stream>| port.close()).await;
        let count = closed.len();
        for (name, outcome) in closed {
            if let Err(e) = outcome.and_then(|r| r) {
                warn!("Close of {} did not complete: {}", name, e);
            }
        }
        debug!("Closed {} port(s)", count);
    }

    /// Read from many ports concurrently
    ///
    /// `max_bytes == 0` reads whatever each port has available. With `None`
    /// or an empty list every tracked port is read. Named ports that are not
    /// open are reported as [`PortError::NotTracked`].
    pub async fn mass_read(
        &mut self,
        max_bytes: usize,
        names: Option<&[String]>,
    ) -> Result<BatchResult<Vec<u8>>, MassError> {
        self.mass_io(names, move |mut port| async move {
            let outcome = port.read(max_bytes).await;
            (port, outcome)
        })
        .await
    }

    /// Write the same payload to many ports concurrently
    ///
    /// Same port selection rules as [`mass_read`](Self::mass_read). Each
    /// outcome is the number of bytes written and flushed.
    pub async fn mass_write(
        &mut self,
        payload: &[u8],
        names: Option<&[String]>,
    ) -> Result<BatchResult<usize>, MassError> {
        let payload: Arc<[u8]> = Arc::from(payload);
        self.mass_io(names, move |mut port| {
            let payload = payload.clone();
            async move {
                let outcome = port.write(&payload).await;
                (port, outcome)
            }
        })
        .await
    }

    /// Discard input already waiting on many ports, without waiting for more
    ///
    /// Same port selection rules as [`mass_read`](Self::mass_read). Each
    /// outcome is the number of stale bytes discarded.
    pub async fn mass_clear_input(
        &mut self,
        names: Option<&[String]>,
    ) -> Result<BatchResult<usize>, MassError> {
        self.mass_io(names, |mut port| async move {
            let outcome = port.clear_input().await;
            (port, outcome)
        })
        .await
    }

    async fn mass_io<T, F, Fut>(
        &mut self,
        names: Option<&[String]>,
        op: F,
    ) -> Result<BatchResult<T>, MassError>
    where
        T: Send + 'static,
        F: Fn(Port<D::Stream>) -> Fut,
        Fut: Future<Output = (Port<D::Stream>, Result<T, PortError>)> + Send + 'static,
    {
        let requested = match names {
            Some(names) if !names.is_empty() => dedup(names),
            _ => self.registry.names(),
        };

        let mut items = Vec::with_capacity(requested.len());
        let mut untracked = Vec::new();
        for name in requested {
            match self.registry.remove(&name) {
                Some(port) => items.push((name, port)),
                None => untracked.push(name),
            }
        }
        if items.is_empty() {
            return Err(MassError::NoPorts);
        }

        let completed = fan_out(items, op).await;

        let mut results = BatchResult::with_capacity(completed.len() + untracked.len());
        for (name, outcome) in completed {
            match outcome {
                Ok((port, result)) => {
                    self.registry.insert(port);
                    results.push(name, result);
                }
                // The port went down with its task and is already gone
                Err(e) => results.push(name, Err(e)),
            }
        }
        for name in untracked {
            results.push(name.clone(), Err(PortError::NotTracked(name)));
        }
        Ok(results)
    }

    async fn track(&mut self, port: Port<D::Stream>) {
        let name = port.name().to_string();
        if let Some(previous) = self.registry.insert(port) {
            debug!("Replacing duplicate handle for {}", name);
            if let Err(e) = previous.close().await {
                debug!("{}", e);
            }
        }
        info!("Opened {}", name);
    }
}

async fn open_port<D: PortDriver>(
    driver: Arc<D>,
    name: String,
    settings: PortSettings,
) -> Result<Port<D::Stream>, PortError> {
    let port = driver.open(&name, &settings)?;
    if !settings.settle_delay.is_zero() {
        tokio::time::sleep(settings.settle_delay).await;
    }
    Ok(port)
}

fn dedup(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}
