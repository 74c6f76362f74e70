//! Shoot Policy Kube - deletion guard for Kubernetes objects
//!
//! This crate provides:
//! - **Deletion Guard**: Check and write the deletion confirmation annotation
//! - **Object Stores**: Optimistic-concurrency access to objects, backed by the
//!   Kubernetes API or kept in memory for tests
//! - **Retry Policy**: Bounded backoff for conflicting updates

pub mod deletion;
pub mod error;
pub mod store;

pub use deletion::{
    Confirmation, check_if_deletion_is_confirmed, confirm_deletion, is_deletion_confirmed,
};
pub use error::{GuardError, Result};
pub use store::{KubeStore, MockObjectStore, ObjectKey, ObjectStore, OperationCounts, RetryPolicy};
