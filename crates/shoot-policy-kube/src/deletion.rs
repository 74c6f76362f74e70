//! Deletion confirmation protocol
//!
//! Destructive operations on a Shoot (or any other guarded object) are only
//! allowed once the owner has annotated it with
//! `confirmation.gardener.cloud/deletion=true`. The legacy key
//! `confirmation.garden.sapcloud.io/deletion` is still honored.
//!
//! [`confirm_deletion`] writes that annotation on behalf of a caller. It reads
//! the latest persisted object, writes only when the confirmation is missing,
//! and retries on optimistic concurrency conflicts:
//!
//! ```text
//!   get ──► not found ──────────────► done (nothing to confirm)
//!    │
//!    ├──► already confirmed ────────► done (no write)
//!    │
//!    └──► annotate ──► update ──► ok ► done
//!                        │
//!                        └─ conflict ─► back off, get again
//! ```

use kube::Resource;
use shoot_policy_core::annotations::{confirmation, has_true_value};
use tracing::debug;

use crate::error::{GuardError, Result};
use crate::store::{ObjectKey, ObjectStore};

/// Whether the object carries a granting confirmation annotation
pub fn is_deletion_confirmed<K: Resource>(obj: &K) -> bool {
    let annotations = obj.meta().annotations.as_ref();
    has_true_value(annotations, confirmation::DELETION)
        || has_true_value(annotations, confirmation::DELETION_DEPRECATED)
}

/// Fail with [`GuardError::DeletionNotConfirmed`] unless deletion is confirmed
pub fn check_if_deletion_is_confirmed<K: Resource>(obj: &K) -> Result<()> {
    if is_deletion_confirmed(obj) {
        return Ok(());
    }
    Err(GuardError::DeletionNotConfirmed {
        expected: confirmation::DELETION.to_string(),
    })
}

/// Outcome of [`confirm_deletion`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The annotation was written
    Confirmed,
    /// The persisted object was already confirmed, nothing written
    AlreadyConfirmed,
    /// The object no longer exists, nothing written
    NotFound,
}

/// Annotate the persisted state of `obj` with the deletion confirmation.
///
/// On `Confirmed` and `AlreadyConfirmed`, `obj` is replaced with the latest
/// persisted state. On `NotFound` it is left untouched. Errors other than
/// not-found and conflict are returned unchanged; conflicts are retried within
/// the store's retry budget and the last conflict is returned once it is spent.
pub async fn confirm_deletion<K, S>(store: &S, obj: &mut K) -> Result<Confirmation>
where
    K: Resource + Clone + Send + Sync,
    S: ObjectStore<K> + ?Sized,
{
    let key = ObjectKey::from_resource(obj)?;
    let policy = store.retry_policy();
    let attempts = policy.steps.max(1);

    let mut attempt = 0;
    loop {
        attempt += 1;

        match try_confirm(store, &key).await {
            Ok(Some((confirmation, latest))) => {
                *obj = latest;
                return Ok(confirmation);
            }
            Ok(None) => {
                debug!(object = %key, "object not found, nothing to confirm");
                return Ok(Confirmation::NotFound);
            }
            Err(e) if e.is_conflict() && attempt < attempts => {
                let delay = policy.delay(attempt - 1);
                debug!(
                    object = %key,
                    attempt,
                    ?delay,
                    "conflict while confirming deletion, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// One fetch-and-update round; `None` if the fetch finds no object
async fn try_confirm<K, S>(store: &S, key: &ObjectKey) -> Result<Option<(Confirmation, K)>>
where
    K: Resource + Clone + Send + Sync,
    S: ObjectStore<K> + ?Sized,
{
    let mut latest = match store.get(key).await {
        Ok(obj) => obj,
        Err(e) if e.is_not_found() => return Ok(None),
        Err(e) => return Err(e),
    };

    if has_true_value(latest.meta().annotations.as_ref(), confirmation::DELETION) {
        debug!(object = %key, "deletion already confirmed");
        return Ok(Some((Confirmation::AlreadyConfirmed, latest)));
    }

    latest
        .meta_mut()
        .annotations
        .get_or_insert_with(Default::default)
        .insert(confirmation::DELETION.to_string(), "true".to_string());

    match store.update(&latest).await {
        Ok(updated) => {
            debug!(object = %key, "deletion confirmed");
            Ok(Some((Confirmation::Confirmed, updated)))
        }
        Err(e) => Err(e),
    }
}
