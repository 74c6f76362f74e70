//! Shoot Policy Core - pure policy evaluation for managed clusters
//!
//! This crate provides the side-effect free building blocks the reconciler
//! consults before acting on a Shoot:
//! - `address`: Deterministic offset addresses inside a subnet
//! - `annotations`: Reserved annotation keys and typed value extraction
//! - `lifecycle`: Ignore, failure, sync period and maintenance decisions
//! - `maintenance`: Daily maintenance time windows
//! - `config`: Configuration injected into the policy evaluator

pub mod address;
pub mod annotations;
pub mod cloud_config;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod maintenance;
pub mod meta;
pub mod shoot;

pub use address::compute_offset_ip;
pub use annotations::{DomainInfo, parse_domain_info};
pub use cloud_config::replace_cloud_provider_config_key;
pub use config::{GARDEN_NAMESPACE, PolicyConfig};
pub use error::{CoreError, Result};
pub use lifecycle::{
    LifecyclePolicy, effective_shoot_maintenance_window,
    is_observed_at_latest_generation_and_succeeded, respect_sync_period_overwrite,
    should_ignore_shoot, sync_period_of_shoot,
};
pub use maintenance::{MaintenanceTime, MaintenanceTimeWindow};
pub use meta::merge_owner_references;
pub use shoot::{LastOperation, LastOperationState, Shoot};
