//! The Shoot resource as seen by policy code
//!
//! Only the fields policies read are modelled. The type implements the
//! `k8s_openapi` resource traits, which makes it usable with `kube::Api`.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A managed cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shoot {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: ShootSpec,

    #[serde(default)]
    pub status: ShootStatus,
}

impl Default for Shoot {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ObjectMeta::default(),
            spec: ShootSpec::default(),
            status: ShootStatus::default(),
        }
    }
}

fn default_api_version() -> String {
    <Shoot as k8s_openapi::Resource>::API_VERSION.to_string()
}

fn default_kind() -> String {
    <Shoot as k8s_openapi::Resource>::KIND.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShootSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance: Option<Maintenance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Maintenance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<MaintenanceTimeWindowSpec>,
}

/// Maintenance window as stored in the resource (`HHMMSS±ZZZZ` strings)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceTimeWindowSpec {
    #[serde(default)]
    pub begin: String,
    #[serde(default)]
    pub end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShootStatus {
    /// Generation last reconciled by the controller
    #[serde(default)]
    pub observed_generation: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_operation: Option<LastOperation>,

    /// Control plane build that produced `last_operation`
    #[serde(default)]
    pub gardener: Gardener,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gardener {
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastOperation {
    pub state: LastOperationState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LastOperation {
    pub fn new(state: LastOperationState) -> Self {
        Self {
            state,
            description: None,
        }
    }
}

/// Outcome of the last reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LastOperationState {
    Succeeded,
    Failed,
    Error,
    Processing,
}

impl Shoot {
    /// Create a Shoot with just a name and namespace
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta {
                name: Some(name.into()),
                namespace: Some(namespace.into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn generation(&self) -> i64 {
        self.metadata.generation.unwrap_or_default()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata.namespace.as_deref()
    }

    pub fn annotations(&self) -> Option<&BTreeMap<String, String>> {
        self.metadata.annotations.as_ref()
    }

    /// Whether the controller has seen the current spec
    pub fn is_observed_at_latest_generation(&self) -> bool {
        self.status.observed_generation == self.generation()
    }

    pub fn last_operation_state(&self) -> Option<LastOperationState> {
        self.status.last_operation.as_ref().map(|op| op.state)
    }
}

impl k8s_openapi::Resource for Shoot {
    const API_VERSION: &'static str = "core.gardener.cloud/v1beta1";
    const GROUP: &'static str = "core.gardener.cloud";
    const KIND: &'static str = "Shoot";
    const VERSION: &'static str = "v1beta1";
    const URL_PATH_SEGMENT: &'static str = "shoots";
    type Scope = k8s_openapi::NamespaceResourceScope;
}

impl k8s_openapi::Metadata for Shoot {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
