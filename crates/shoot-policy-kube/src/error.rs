//! Error types for shoot-policy-kube

use thiserror::Error;

/// Result type for shoot-policy-kube operations
pub type Result<T> = std::result::Result<T, GuardError>;

/// Errors that can occur while guarding or confirming destructive operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GuardError {
    /// Deletion attempted without owner confirmation
    #[error("deletion is not confirmed\nHint: annotate the object with '{expected}=true' to confirm")]
    DeletionNotConfirmed { expected: String },

    /// Object not found in the store
    #[error("{kind} '{name}' not found{}", namespace_suffix(namespace))]
    NotFound {
        kind: String,
        name: String,
        namespace: Option<String>,
    },

    /// Optimistic concurrency check failed
    #[error("conflict updating {kind} '{name}': {message}")]
    Conflict {
        kind: String,
        name: String,
        message: String,
    },

    /// Object is missing identity needed to address it in the store
    #[error("invalid object: {0}")]
    InvalidObject(String),

    /// Any other Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),
}

fn namespace_suffix(namespace: &Option<String>) -> String {
    namespace
        .as_ref()
        .map(|ns| format!(" in namespace '{ns}'"))
        .unwrap_or_default()
}

impl GuardError {
    /// Check if this is a not-found error (HTTP 404)
    pub fn is_not_found(&self) -> bool {
        match self {
            GuardError::NotFound { .. } => true,
            GuardError::Api(kube::Error::Api(resp)) => resp.code == 404,
            _ => false,
        }
    }

    /// Check if this is a conflict error (HTTP 409)
    pub fn is_conflict(&self) -> bool {
        match self {
            GuardError::Conflict { .. } => true,
            GuardError::Api(kube::Error::Api(resp)) => resp.code == 409,
            _ => false,
        }
    }
}
