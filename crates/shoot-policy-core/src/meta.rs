//! Object metadata helpers

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;

/// Merge owner references by UID.
///
/// A new reference replaces an existing one with the same UID in place;
/// references with unknown UIDs are appended in order.
pub fn merge_owner_references(
    mut references: Vec<OwnerReference>,
    new_references: impl IntoIterator<Item = OwnerReference>,
) -> Vec<OwnerReference> {
    for new_ref in new_references {
        match references.iter_mut().find(|r| r.uid == new_ref.uid) {
            Some(existing) => *existing = new_ref,
            None => references.push(new_ref),
        }
    }
    references
}
