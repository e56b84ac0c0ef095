//! Per-port outcomes of one batch call

use lifi_port::PortError;

/// One `(port name, outcome)` pair per port submitted to a batch call
///
/// The set of names always equals the set submitted: no drops, no
/// duplicates.
#[derive(Debug)]
pub struct BatchResult<T> {
    outcomes: Vec<(String, Result<T, PortError>)>,
}

impl<T> BatchResult<T> {
    /// Empty result
    pub fn new() -> Self {
        Self {
            outcomes: Vec::new(),
        }
    }

    /// Empty result with room for `capacity` outcomes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: String, outcome: Result<T, PortError>) {
        debug_assert!(
            self.get(&name).is_none(),
            "duplicate outcome for port {name}"
        );
        self.outcomes.push((name, outcome));
    }

    /// Number of outcomes
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the batch had no ports
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Iterate over `(name, outcome)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Result<T, PortError>)> {
        self.outcomes.iter().map(|(name, outcome)| (name.as_str(), outcome))
    }

    /// Outcome for one port
    pub fn get(&self, name: &str) -> Option<&Result<T, PortError>> {
        self.outcomes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, outcome)| outcome)
    }

    /// Names of every submitted port
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().map(|(name, _)| name.as_str())
    }

    /// Ports whose operation succeeded
    pub fn successes(&self) -> impl Iterator<Item = (&str, &T)> {
        self.outcomes
            .iter()
            .filter_map(|(name, outcome)| outcome.as_ref().ok().map(|v| (name.as_str(), v)))
    }

    /// Ports whose operation failed
    pub fn failures(&self) -> impl Iterator<Item = (&str, &PortError)> {
        self.outcomes
            .iter()
            .filter_map(|(name, outcome)| outcome.as_ref().err().map(|e| (name.as_str(), e)))
    }
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntoIterator for BatchResult<T> {
    type Item = (String, Result<T, PortError>);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}
