use std::fmt::Write as _;

use sha2::{Digest, Sha256};

/// Bytes of the SHA-256 kept for the log digest.
const DIGEST_PREFIX_BYTES: usize = 8;

/// Short SHA-256 prefix identifying an upload in log lines.
///
/// Two uploads of the same file share a digest, so repeated submissions can
/// be spotted without logging any document content.
pub fn upload_digest(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    hash.iter().take(DIGEST_PREFIX_BYTES).fold(String::with_capacity(DIGEST_PREFIX_BYTES * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}
