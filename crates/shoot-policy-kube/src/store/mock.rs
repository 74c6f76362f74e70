//! Mock object store for testing
//!
//! This store keeps objects in memory and enforces resource versions the
//! way the API server does, useful for unit tests without requiring a
//! Kubernetes cluster. Concurrent writers and failures can be scripted.

use async_trait::async_trait;
use kube::Resource;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use super::{ObjectKey, ObjectStore, RetryPolicy, kind_of};
use crate::error::{GuardError, Result};

type ConcurrentWrite<K> = Box<dyn FnOnce(&mut K) + Send + Sync>;

/// In-memory object store for testing
pub struct MockObjectStore<K> {
    /// Storage: key -> latest persisted object
    objects: Arc<RwLock<HashMap<ObjectKey, K>>>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
    /// Every object passed to `update`, in call order
    updates: Arc<RwLock<Vec<K>>>,
    /// Writes by "another client" applied right before the next updates
    concurrent_writes: Arc<RwLock<VecDeque<ConcurrentWrite<K>>>>,
    /// Errors returned by the next `get` calls
    get_errors: Arc<RwLock<VecDeque<GuardError>>>,
    /// Errors returned by the next `update` calls
    update_errors: Arc<RwLock<VecDeque<GuardError>>>,
    retry_policy: RetryPolicy,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub gets: usize,
    pub updates: usize,
}

impl<K> Clone for MockObjectStore<K> {
    fn clone(&self) -> Self {
        Self {
            objects: Arc::clone(&self.objects),
            operations: Arc::clone(&self.operations),
            updates: Arc::clone(&self.updates),
            concurrent_writes: Arc::clone(&self.concurrent_writes),
            get_errors: Arc::clone(&self.get_errors),
            update_errors: Arc::clone(&self.update_errors),
            retry_policy: self.retry_policy,
        }
    }
}

impl<K> Default for MockObjectStore<K>
where
    K: Resource + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> MockObjectStore<K>
where
    K: Resource + Clone,
{
    /// Create a new empty store that retries conflicts without delay
    pub fn new() -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            operations: Arc::new(RwLock::new(OperationCounts::default())),
            updates: Arc::new(RwLock::new(Vec::new())),
            concurrent_writes: Arc::new(RwLock::new(VecDeque::new())),
            get_errors: Arc::new(RwLock::new(VecDeque::new())),
            update_errors: Arc::new(RwLock::new(VecDeque::new())),
            retry_policy: RetryPolicy::immediate(5),
        }
    }

    /// Create with pre-populated objects
    pub fn with_objects(objects: impl IntoIterator<Item = K>) -> Self {
        let store = Self::new();
        for obj in objects {
            store.insert(obj);
        }
        store
    }

    /// Override the retry budget reported to callers
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Persist an object directly, assigning resource version "1" if unset
    ///
    /// # Panics
    ///
    /// Panics if the object has no name.
    pub fn insert(&self, mut obj: K) {
        let key = ObjectKey::from_resource(&obj).expect("objects in the mock store need a name");
        let meta = obj.meta_mut();
        if meta.resource_version.is_none() {
            meta.resource_version = Some("1".to_string());
        }
        self.objects.write().unwrap().insert(key, obj);
    }

    /// Delete an object, as if another client removed it
    pub fn remove(&self, key: &ObjectKey) -> Option<K> {
        self.objects.write().unwrap().remove(key)
    }

    /// Current persisted state of an object (for assertions)
    pub fn stored(&self, key: &ObjectKey) -> Option<K> {
        self.objects.read().unwrap().get(key).cloned()
    }

    /// Objects passed to `update`, including rejected ones
    pub fn recorded_updates(&self) -> Vec<K> {
        self.updates.read().unwrap().clone()
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }

    /// Reset operation counts and recorded updates
    pub fn reset_counts(&self) {
        *self.operations.write().unwrap() = OperationCounts::default();
        self.updates.write().unwrap().clear();
    }

    /// Simulate another client writing the object right before the next update.
    ///
    /// The write bumps the stored resource version, so the pending update
    /// fails with a conflict.
    pub fn concurrent_write_before_next_update(
        &self,
        write: impl FnOnce(&mut K) + Send + Sync + 'static,
    ) {
        self.concurrent_writes
            .write()
            .unwrap()
            .push_back(Box::new(write));
    }

    /// Make the next `get` fail with `err`
    pub fn fail_next_get(&self, err: GuardError) {
        self.get_errors.write().unwrap().push_back(err);
    }

    /// Make the next `update` fail with `err`
    pub fn fail_next_update(&self, err: GuardError) {
        self.update_errors.write().unwrap().push_back(err);
    }
}

fn next_resource_version(current: Option<&str>) -> String {
    let version: u64 = current.and_then(|v| v.parse().ok()).unwrap_or(0);
    (version + 1).to_string()
}

#[async_trait]
impl<K> ObjectStore<K> for MockObjectStore<K>
where
    K: Resource + Clone + Send + Sync + 'static,
    K::DynamicType: Default,
{
    async fn get(&self, key: &ObjectKey) -> Result<K> {
        {
            let mut ops = self.operations.write().unwrap();
            ops.gets += 1;
        }

        if let Some(err) = self.get_errors.write().unwrap().pop_front() {
            return Err(err);
        }

        let objects = self.objects.read().unwrap();
        objects.get(key).cloned().ok_or_else(|| GuardError::NotFound {
            kind: kind_of::<K>(),
            name: key.name.clone(),
            namespace: key.namespace.clone(),
        })
    }

    async fn update(&self, obj: &K) -> Result<K> {
        {
            let mut ops = self.operations.write().unwrap();
            ops.updates += 1;
        }
        self.updates.write().unwrap().push(obj.clone());

        if let Some(err) = self.update_errors.write().unwrap().pop_front() {
            return Err(err);
        }

        let key = ObjectKey::from_resource(obj)?;
        let mut objects = self.objects.write().unwrap();
        let Some(stored) = objects.get_mut(&key) else {
            return Err(GuardError::NotFound {
                kind: kind_of::<K>(),
                name: key.name,
                namespace: key.namespace,
            });
        };

        if let Some(write) = self.concurrent_writes.write().unwrap().pop_front() {
            write(&mut *stored);
            let meta = stored.meta_mut();
            meta.resource_version = Some(next_resource_version(meta.resource_version.as_deref()));
        }

        if obj.meta().resource_version != stored.meta().resource_version {
            return Err(GuardError::Conflict {
                kind: kind_of::<K>(),
                name: key.name,
                message: "the object has been modified; please apply your changes to the latest version and try again".to_string(),
            });
        }

        let mut updated = obj.clone();
        updated.meta_mut().resource_version =
            Some(next_resource_version(stored.meta().resource_version.as_deref()));
        *stored = updated.clone();

        Ok(updated)
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::Namespace;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::BTreeMap;

    fn namespace(name: &str) -> Namespace {
        Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn key(name: &str) -> ObjectKey {
        ObjectKey::new(None, name)
    }

    #[tokio::test]
    async fn test_mock_insert_and_get() {
        let store = MockObjectStore::with_objects([namespace("garden")]);

        let fetched = store.get(&key("garden")).await.unwrap();
        assert_eq!(fetched.metadata.name.as_deref(), Some("garden"));
        assert_eq!(fetched.metadata.resource_version.as_deref(), Some("1"));

        let counts = store.operation_counts();
        assert_eq!(counts.gets, 1);
        assert_eq!(counts.updates, 0);
    }

    #[tokio::test]
    async fn test_mock_get_not_found() {
        let store = MockObjectStore::<Namespace>::new();

        let result = store.get(&key("missing")).await;
        assert!(matches!(result, Err(GuardError::NotFound { ref kind, .. }) if kind == "Namespace"));
    }

    #[tokio::test]
    async fn test_mock_update_bumps_resource_version() {
        let store = MockObjectStore::with_objects([namespace("garden")]);

        let mut obj = store.get(&key("garden")).await.unwrap();
        obj.metadata.labels = Some(BTreeMap::from([("role".to_string(), "garden".to_string())]));

        let updated = store.update(&obj).await.unwrap();
        assert_eq!(updated.metadata.resource_version.as_deref(), Some("2"));

        let stored = store.stored(&key("garden")).unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_mock_update_stale_version_conflicts() {
        let store = MockObjectStore::with_objects([namespace("garden")]);

        let stale = store.get(&key("garden")).await.unwrap();
        store.update(&stale).await.unwrap();

        let result = store.update(&stale).await;
        assert!(matches!(result, Err(GuardError::Conflict { .. })));
        assert_eq!(store.recorded_updates().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_concurrent_write() {
        let store = MockObjectStore::with_objects([namespace("garden")]);
        store.concurrent_write_before_next_update(|ns: &mut Namespace| {
            ns.metadata.labels = Some(BTreeMap::from([("owner".to_string(), "other".to_string())]));
        });

        let obj = store.get(&key("garden")).await.unwrap();
        let result = store.update(&obj).await;
        assert!(result.unwrap_err().is_conflict());

        let stored = store.stored(&key("garden")).unwrap();
        assert_eq!(stored.metadata.resource_version.as_deref(), Some("2"));
        assert!(stored.metadata.labels.unwrap().contains_key("owner"));
    }

    #[tokio::test]
    async fn test_mock_remove() {
        let store = MockObjectStore::with_objects([namespace("garden")]);
        assert!(store.remove(&key("garden")).is_some());
        assert!(store.get(&key("garden")).await.unwrap_err().is_not_found());
    }

    #[test]
    #[should_panic(expected = "need a name")]
    fn test_mock_insert_requires_name() {
        MockObjectStore::<Namespace>::new().insert(Namespace::default());
    }

    #[tokio::test]
    async fn test_mock_update_missing_object() {
        let store = MockObjectStore::<Namespace>::new();
        let result = store.update(&namespace("gone")).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_mock_injected_errors() {
        let store = MockObjectStore::with_objects([namespace("garden")]);
        store.fail_next_get(GuardError::InvalidObject("boom".to_string()));

        let result = store.get(&key("garden")).await;
        assert!(matches!(result, Err(GuardError::InvalidObject(_))));

        // Only the next call fails
        assert!(store.get(&key("garden")).await.is_ok());
    }

    #[tokio::test]
    async fn test_operation_counts() {
        let store = MockObjectStore::with_objects([namespace("garden")]);

        let obj = store.get(&key("garden")).await.unwrap();
        store.update(&obj).await.unwrap();

        assert_eq!(
            store.operation_counts(),
            OperationCounts {
                gets: 1,
                updates: 1
            }
        );

        store.reset_counts();
        assert_eq!(store.operation_counts(), OperationCounts::default());
        assert!(store.recorded_updates().is_empty());
    }
}
