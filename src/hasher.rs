//! Content fingerprinting of attachment bytes.
use crate::types::ContentFingerprint;

/// Compute the content fingerprint of a byte sequence.
///
/// MD5 digest rendered as 32 lowercase hex characters. Depends on the bytes
/// only, so the same file content always maps to the same name; this keeps
/// names compatible with attachments renamed by earlier tooling.
pub fn fingerprint(bytes: &[u8]) -> ContentFingerprint {
    let digest = md5::compute(bytes);
    return ContentFingerprint(format!("{digest:x}"));
}
