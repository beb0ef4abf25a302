//! Content addressing for stored text.
//!
//! A document's identifier is the SHA-1 digest of its UTF-8 bytes rendered as
//! 40 lowercase hex characters. SHA-1 is collision-findable; the identifier
//! only deduplicates accidental repeats and must not be relied on against an
//! adversary choosing inputs.

use sha1::{Digest, Sha1};

/// Length of an identifier produced by [`content_id`].
pub const CONTENT_ID_LEN: usize = 40;

/// Derive the content identifier for `text`.
///
/// Identical text always yields the identical identifier, so storing the same
/// text twice overwrites a single index entry.
///
/// ```rust
/// assert_eq!(
///     simstore_rag::content_id("hello world"),
///     "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
/// );
/// ```
pub fn content_id(text: &str) -> String {
    let digest = Sha1::digest(text.as_bytes());
    format!("{digest:x}")
}

/// Whether `id` has the shape of a content identifier.
pub fn is_content_id(id: &str) -> bool {
    id.len() == CONTENT_ID_LEN && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
