//! Cryptographic digests for chain-of-custody records.

use sha2::Digest;
use sha2::Sha256;

/// Computes the SHA-256 digest of `data` as lowercase hex.
///
/// # Examples
///
/// ```
/// use exhibit_core::hashing::sha256_hex;
///
/// assert_eq!(
///     sha256_hex(b"abc"),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// ```
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
