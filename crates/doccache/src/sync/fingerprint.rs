use crate::entity::doc_blob::DocBlob;

/// Whether a cached blob can be kept as-is.
///
/// True only when not forced, a blob is cached, and its fingerprint equals
/// `fingerprint` exactly. Fingerprints are opaque: no normalization.
#[inline]
pub fn is_unchanged(existing: Option<&DocBlob>, fingerprint: &str, force: bool) -> bool {
    !force && existing.is_some_and(|blob| blob.fingerprint == fingerprint)
}
