//! Reserved annotation keys and typed extraction of policy values
//!
//! Every key is an exact-match constant. Values are always strings on the
//! wire; helpers here turn them into the types policy code works with.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{CoreError, Result};

/// DNS provider and domain annotations on a Shoot or Secret
pub mod dns {
    /// DNS provider type
    pub const PROVIDER: &str = "dns.gardener.cloud/provider";
    /// Base domain
    pub const DOMAIN: &str = "dns.gardener.cloud/domain";
    /// Comma-separated hosted zones to include
    pub const INCLUDE_ZONES: &str = "dns.gardener.cloud/include-zones";
    /// Comma-separated hosted zones to exclude
    pub const EXCLUDE_ZONES: &str = "dns.gardener.cloud/exclude-zones";
}

/// Shoot reconciliation overrides
pub mod shoot {
    /// Skip reconciliation of this Shoot entirely
    pub const IGNORE: &str = "shoot.garden.sapcloud.io/ignore";
    /// Per-Shoot reconciliation interval
    pub const SYNC_PERIOD: &str = "shoot.garden.sapcloud.io/sync-period";
}

/// Owner confirmation for destructive operations
pub mod confirmation {
    /// Current deletion confirmation key
    pub const DELETION: &str = "confirmation.gardener.cloud/deletion";
    /// Legacy deletion confirmation key, still honored
    pub const DELETION_DEPRECATED: &str = "confirmation.garden.sapcloud.io/deletion";
}

/// Get annotation value, if present
pub fn get_annotation<'a>(annotations: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    annotations.get(key).map(|s| s.as_str())
}

/// Check whether an annotation is set to exactly `"true"`
pub fn has_true_value(annotations: Option<&BTreeMap<String, String>>, key: &str) -> bool {
    annotations
        .and_then(|a| get_annotation(a, key))
        .is_some_and(|v| v == "true")
}

/// Split a comma-separated annotation value into its tokens, verbatim
pub fn parse_list(value: &str) -> Vec<String> {
    value.split(',').map(str::to_string).collect()
}

/// DNS configuration carried in annotations
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainInfo {
    pub provider: String,
    pub domain: String,
    pub include_zones: Vec<String>,
    pub exclude_zones: Vec<String>,
}

/// Extract provider, domain and zone filters from DNS annotations.
///
/// Provider and domain are required; zone lists default to empty.
pub fn parse_domain_info(annotations: &BTreeMap<String, String>) -> Result<DomainInfo> {
    let required = |key: &str| {
        get_annotation(annotations, key)
            .map(str::to_string)
            .ok_or_else(|| CoreError::MissingAnnotation {
                key: key.to_string(),
            })
    };

    let provider = required(dns::PROVIDER)?;
    let domain = required(dns::DOMAIN)?;

    let zones = |key: &str| get_annotation(annotations, key).map(parse_list).unwrap_or_default();

    Ok(DomainInfo {
        provider,
        domain,
        include_zones: zones(dns::INCLUDE_ZONES),
        exclude_zones: zones(dns::EXCLUDE_ZONES),
    })
}

/// Parse a duration expression such as "90s", "2m" or "1h30m".
///
/// Returns `None` for anything unparsable so callers can fall back to a default.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    humantime::parse_duration(value).ok()
}
