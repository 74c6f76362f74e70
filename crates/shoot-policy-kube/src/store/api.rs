//! Kubernetes API backed object store

use async_trait::async_trait;
use k8s_openapi::{ClusterResourceScope, NamespaceResourceScope};
use kube::api::{Api, PostParams};
use kube::{Client, Resource};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use super::{ObjectKey, ObjectStore, RetryPolicy, kind_of};
use crate::error::{GuardError, Result};

/// Object store talking to the Kubernetes API server
///
/// Updates use `replace`, which sends the resource version along and is
/// rejected with 409 when it is stale.
pub struct KubeStore<K> {
    client: Client,
    api_for: fn(Client, Option<&str>) -> Api<K>,
    retry_policy: RetryPolicy,
}

impl<K> KubeStore<K>
where
    K: Resource<Scope = NamespaceResourceScope>,
    K::DynamicType: Default,
{
    /// Store for namespaced resources; keys without namespace use the client default
    pub fn namespaced(client: Client) -> Self {
        Self {
            client,
            api_for: |client, namespace| match namespace {
                Some(ns) => Api::namespaced(client, ns),
                None => Api::default_namespaced(client),
            },
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl<K> KubeStore<K>
where
    K: Resource<Scope = ClusterResourceScope>,
    K::DynamicType: Default,
{
    /// Store for cluster-scoped resources; key namespaces are ignored
    pub fn cluster(client: Client) -> Self {
        Self {
            client,
            api_for: |client, _| Api::all(client),
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl<K> KubeStore<K> {
    /// Override the conflict retry budget
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    fn api(&self, namespace: Option<&str>) -> Api<K> {
        (self.api_for)(self.client.clone(), namespace)
    }
}

/// Map 404 and 409 responses to their dedicated variants
fn map_api_error<K>(err: kube::Error, key: &ObjectKey) -> GuardError
where
    K: Resource,
    K::DynamicType: Default,
{
    match err {
        kube::Error::Api(resp) if resp.code == 404 => GuardError::NotFound {
            kind: kind_of::<K>(),
            name: key.name.clone(),
            namespace: key.namespace.clone(),
        },
        kube::Error::Api(resp) if resp.code == 409 => GuardError::Conflict {
            kind: kind_of::<K>(),
            name: key.name.clone(),
            message: resp.message,
        },
        e => GuardError::Api(e),
    }
}

#[async_trait]
impl<K> ObjectStore<K> for KubeStore<K>
where
    K: Resource + Clone + DeserializeOwned + Serialize + Debug + Send + Sync + 'static,
    K::DynamicType: Default,
{
    async fn get(&self, key: &ObjectKey) -> Result<K> {
        self.api(key.namespace.as_deref())
            .get(&key.name)
            .await
            .map_err(|e| map_api_error::<K>(e, key))
    }

    async fn update(&self, obj: &K) -> Result<K> {
        let key = ObjectKey::from_resource(obj)?;
        self.api(key.namespace.as_deref())
            .replace(&key.name, &PostParams::default(), obj)
            .await
            .map_err(|e| map_api_error::<K>(e, &key))
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }
}
