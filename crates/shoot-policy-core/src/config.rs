//! Policy configuration injected into [`LifecyclePolicy`](crate::LifecyclePolicy)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Namespace of the garden's own system Shoots
pub const GARDEN_NAMESPACE: &str = "garden";

/// Configuration for lifecycle policy evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    /// Version of the running control plane, compared against `status.gardener.version`
    #[serde(default = "default_gardener_version")]
    pub gardener_version: String,

    /// Honor per-Shoot ignore and sync-period annotations
    #[serde(default)]
    pub respect_sync_period_overwrite: bool,

    /// Lower bound for the reconciliation interval
    #[serde(default = "default_min_sync_period", with = "humantime_serde")]
    pub min_sync_period: Duration,

    /// Namespace whose Shoots always honor overrides
    #[serde(default = "default_garden_namespace")]
    pub garden_namespace: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            gardener_version: default_gardener_version(),
            respect_sync_period_overwrite: false,
            min_sync_period: default_min_sync_period(),
            garden_namespace: default_garden_namespace(),
        }
    }
}

impl PolicyConfig {
    /// Config for a specific control plane version, everything else defaulted
    pub fn for_version(version: impl Into<String>) -> Self {
        Self {
            gardener_version: version.into(),
            ..Default::default()
        }
    }
}

fn default_gardener_version() -> String {
    format!("v{}", env!("CARGO_PKG_VERSION"))
}

fn default_min_sync_period() -> Duration {
    Duration::from_secs(3600)
}

fn default_garden_namespace() -> String {
    GARDEN_NAMESPACE.to_string()
}
