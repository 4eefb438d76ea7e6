use std::fmt;
use std::sync::Arc;

use super::metrics::{default_metrics, IndexMetrics};

/// Configuration for building a [`super::NetworkSnapshot`].
#[derive(Clone)]
pub struct SnapshotOptions {
    /// Whether every link endpoint must be a registered node.
    pub validate_endpoints: bool,
    /// Metrics sink
    pub metrics: Arc<dyn IndexMetrics>,
}

impl SnapshotOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self {
            validate_endpoints: true,
            metrics: default_metrics(),
        }
    }

    /// Enables or disables link endpoint validation.
    pub fn validate_endpoints(mut self, enabled: bool) -> Self {
        self.validate_endpoints = enabled;
        self
    }

    /// Sets the metrics collection implementation.
    pub fn metrics(mut self, metrics: Arc<dyn IndexMetrics>) -> Self {
        self.metrics = metrics;
        self
    }
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SnapshotOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotOptions")
            .field("validate_endpoints", &self.validate_endpoints)
            .finish_non_exhaustive()
    }
}
