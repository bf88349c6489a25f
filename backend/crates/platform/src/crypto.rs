//! Cryptographic Utilities

use rand::{RngCore, rngs::OsRng};

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generate a lowercase hex token from `byte_len` random bytes
///
/// The resulting string is `2 * byte_len` characters long.
pub fn random_hex(byte_len: usize) -> String {
    let mut out = String::with_capacity(byte_len * 2);
    for b in random_bytes(byte_len) {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
