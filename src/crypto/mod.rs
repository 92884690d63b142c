//! Cryptographic primitives for password hashing.
//!
//! Provides PBKDF2 key derivation, salt generation and constant-time comparison.

pub mod kdf;
pub mod random;

use subtle::ConstantTimeEq;

pub use kdf::{Algorithm, KdfParams, derive_subkey};
pub use random::{OsRandom, SaltSource, generate_salt, generate_salt_with};

/// Default salt length for new hashes (16 bytes).
pub const DEFAULT_SALT_LEN: usize = 16;
/// Default PBKDF2 iteration count for new hashes.
pub const DEFAULT_ITERATIONS: u32 = 10_000;
/// Default subkey length for new hashes (32 bytes / 256 bits).
pub const DEFAULT_SUBKEY_LEN: usize = 32;

/// Compares two byte strings without leaking the position of the first
/// difference. Lengths are not treated as secret.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_slices_match() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn differing_content_or_length_does_not_match() {
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(!constant_time_eq(b"", b"a"));
    }
}
