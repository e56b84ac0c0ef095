//! Registry of open ports

use std::collections::HashMap;

use lifi_port::Port;

/// Canonical port name to open port
///
/// Every value is open. Removal hands the port back to the caller, who is
/// responsible for closing it in the same step.
#[derive(Debug)]
pub struct PortRegistry<S> {
    ports: HashMap<String, Port<S>>,
}

impl<S> PortRegistry<S> {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            ports: HashMap::new(),
        }
    }

    /// Number of open ports
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Whether no port is open
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Whether `name` is open
    pub fn contains(&self, name: &str) -> bool {
        self.ports.contains_key(name)
    }

    /// Look up an open port
    pub fn get(&self, name: &str) -> Option<&Port<S>> {
        self.ports.get(name)
    }

    /// Sorted names of every open port
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.ports.keys().cloned().collect();
        names.sort();
        names
    }

    /// Iterate over open ports in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Port<S>> {
        self.ports.values()
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Port<S>> {
        self.ports.get_mut(name)
    }

    /// Track a port under its canonical name, returning any port it displaced
    pub(crate) fn insert(&mut self, port: Port<S>) -> Option<Port<S>> {
        self.ports.insert(port.name().to_string(), port)
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Port<S>> {
        self.ports.remove(name)
    }

    pub(crate) fn drain(&mut self) -> Vec<Port<S>> {
        self.ports.drain().map(|(_, port)| port).collect()
    }
}

impl<S> Default for PortRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
