//! Object stores the deletion guard reads from and writes to
//!
//! - **Kube** (`KubeStore`): Backed by the Kubernetes API
//! - **Mock** (`MockObjectStore`): In-memory, for tests without a cluster
//!
//! Every store offers the two operations optimistic concurrency needs: a read
//! that returns the current resource version, and a conditional update that
//! fails with a conflict when that version is stale.

mod api;
mod mock;

pub use api::KubeStore;
pub use mock::{MockObjectStore, OperationCounts};

use async_trait::async_trait;
use kube::Resource;
use std::fmt;
use std::time::Duration;

use crate::error::{GuardError, Result};

/// Identity of an object in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    /// `None` for cluster-scoped objects
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            name: name.into(),
        }
    }

    /// Key of an in-memory object; fails if it has no name
    pub fn from_resource<K: Resource>(obj: &K) -> Result<Self> {
        let meta = obj.meta();
        let name = meta
            .name
            .clone()
            .ok_or_else(|| GuardError::InvalidObject("object has no name".to_string()))?;
        Ok(Self {
            namespace: meta.namespace.clone(),
            name,
        })
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Kind name of a statically typed resource, for error messages
pub(crate) fn kind_of<K>() -> String
where
    K: Resource,
    K::DynamicType: Default,
{
    K::kind(&K::DynamicType::default()).to_string()
}

/// Bounded retry budget for conflicting updates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts
    pub steps: u32,
    /// Delay before the first retry
    pub duration: Duration,
    /// Multiplier applied to the delay after each retry
    pub factor: f64,
    /// Random extra delay, as a fraction of the current delay
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            steps: 5,
            duration: Duration::from_millis(10),
            factor: 1.0,
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    /// Retry immediately, up to `steps` attempts
    pub fn immediate(steps: u32) -> Self {
        Self {
            steps,
            duration: Duration::ZERO,
            factor: 1.0,
            jitter: 0.0,
        }
    }

    /// Delay to wait before retry number `retry` (0-based), without jitter
    pub fn base_delay(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let nanos = self.duration.as_nanos() as f64 * self.factor.max(1.0).powi(exponent);
        Duration::from_nanos(nanos.round() as u64)
    }

    /// Delay to wait before retry number `retry` (0-based)
    pub fn delay(&self, retry: u32) -> Duration {
        let base = self.base_delay(retry);
        if self.jitter <= 0.0 || base.is_zero() {
            return base;
        }
        let extra = base.as_nanos() as f64 * self.jitter * rand::random::<f64>();
        base + Duration::from_nanos(extra.round() as u64)
    }
}

/// Store of Kubernetes-style objects with optimistic concurrency
///
/// Implementations must be Send + Sync for use across async tasks.
#[async_trait]
pub trait ObjectStore<K>: Send + Sync
where
    K: Resource + Send + Sync,
{
    /// Fetch the current persisted state of an object
    async fn get(&self, key: &ObjectKey) -> Result<K>;

    /// Persist `obj` if its resource version is still current.
    ///
    /// Returns the stored object with its new resource version, or
    /// [`GuardError::Conflict`] if someone else wrote in between.
    async fn update(&self, obj: &K) -> Result<K>;

    /// Retry budget callers should use on conflicts
    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
    }
}
