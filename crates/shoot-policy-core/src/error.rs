//! Core error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CoreError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("cannot compute IP with offset {offset} - subnet {subnet} too small")]
    SubnetTooSmall { subnet: String, offset: u64 },

    #[error("computed IPv4 address {address} is the broadcast address of subnet {subnet}")]
    BroadcastAddress { address: String, subnet: String },

    #[error("missing annotation '{key}'")]
    MissingAnnotation { key: String },

    #[error("invalid maintenance time '{value}': {reason}")]
    InvalidMaintenanceTime { value: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
