//! Stable content fingerprints, used as cache keys.

use md5::{Digest, Md5};

/// Hex-encoded MD5 of `input`. Used wherever the pipeline needs a short,
/// stable, filesystem-safe key derived from arbitrary content (cache
/// filenames, LLM request dedup keys).
pub fn fingerprint(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}
