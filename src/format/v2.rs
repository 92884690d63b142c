//! Legacy hash format v2.
//!
//! ```text
//! MARKER = 0x00 (1) | SALT (16) | SUBKEY (32)
//! ```
//!
//! The subkey is always PBKDF2-HMAC-SHA1 with 1000 iterations. None of these
//! parameters are stored; they are implied by the marker.

use super::{DecodedHash, Format, slice};
use crate::crypto::{Algorithm, derive_subkey};
use crate::error::HashError;

pub const MARKER: u8 = 0;
pub const SALT_LEN: usize = 16;
pub const SUBKEY_LEN: usize = 32;
pub const ITERATIONS: u32 = 1000;
pub const ALGORITHM: Algorithm = Algorithm::Sha1;

const SALT_OFFSET: usize = 1;
const SUBKEY_OFFSET: usize = SALT_OFFSET + SALT_LEN;

/// Total length of every v2 hash.
pub const LEN: usize = SUBKEY_OFFSET + SUBKEY_LEN;

/// Builds a v2 hash. Only used to re-derive stored hashes; new hashes are
/// always written as v3.
pub(crate) fn hash_password(password: &[u8], salt: &[u8; SALT_LEN]) -> Vec<u8> {
    let subkey = derive_subkey(password, salt, ALGORITHM, ITERATIONS, SUBKEY_LEN);

    let mut buf = Vec::with_capacity(LEN);
    buf.push(MARKER);
    buf.extend_from_slice(salt);
    buf.extend_from_slice(&subkey);
    buf
}

/// Parses a v2 hash.
///
/// # Errors
///
/// Returns an error if the marker is wrong or the buffer is not exactly
/// [`LEN`] bytes.
pub fn parse(data: &[u8]) -> Result<DecodedHash<'_>, HashError> {
    if data.first() != Some(&MARKER) {
        return Err(HashError::Malformed("not a v2 hash"));
    }
    if data.len() != LEN {
        return Err(HashError::Malformed("v2 hash must be 49 bytes"));
    }

    let salt = slice(data, SALT_OFFSET, SUBKEY_OFFSET)
        .map_err(|_| HashError::Malformed("v2 salt out of range"))?;
    let subkey = slice(data, SUBKEY_OFFSET, LEN)
        .map_err(|_| HashError::Malformed("v2 subkey out of range"))?;

    Ok(DecodedHash::new(
        Format::V2,
        ALGORITHM,
        ITERATIONS,
        salt,
        subkey,
    ))
}

pub(crate) fn check(data: &[u8], password: &[u8]) -> Result<bool, HashError> {
    parse(data)?.matches(data, password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    fn b64(s: &str) -> Vec<u8> {
        STANDARD.decode(s).unwrap()
    }

    fn verify(data: &[u8], password: &[u8]) -> bool {
        check(data, password).unwrap_or(false)
    }

    fn counter_salt() -> [u8; SALT_LEN] {
        std::array::from_fn(|i| i as u8)
    }

    #[test]
    fn known_hash_is_reproduced() {
        let got = hash_password(b"my password", &counter_salt());
        assert_eq!(
            got,
            b64("AAABAgMEBQYHCAkKCwwNDg+ukCEMDf0yyQ29NYubggHIVY0sdEUfdyeM+E1LtH1uJg==")
        );
        assert_eq!(got.len(), LEN);
    }

    #[test]
    fn verify_success() {
        let hash = b64("ANXrDknc7fGPpigibZXXZFMX4aoqz44JveK6jQuwY3eH/UyPhvr5xTPeGYEckLxz9A==");
        assert!(verify(&hash, b"my password"));
    }

    #[test]
    fn verify_wrong_password_fails() {
        let hash = b64("ANXrDknc7fGPpigibZXXZFMX4aoqz44JveK6jQuwY3eH/UyPhvr5xTPeGYEckLxz9A==");
        assert!(!verify(&hash, b"my passw0rd"));
        assert_eq!(check(&hash, b"my passw0rd"), Ok(false));
    }

    #[test]
    fn verify_tampered_subkey_fails() {
        let hash = b64("AAABAgMEBQYHCAkKCwwNDg+uAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAALtH1uJg==");
        assert!(!verify(&hash, b"my password"));
    }

    #[test]
    fn verify_too_short_fails() {
        let hash = b64("AAABAgMEBQYHCAkKCwwNDg+ukCEMDf0yyQ29NYubggE=");
        assert!(!verify(&hash, b"my password"));
        assert!(matches!(check(&hash, b"my password"), Err(HashError::Malformed(_))));
    }

    #[test]
    fn verify_extra_data_at_end_fails() {
        let hash = b64("AAABAgMEBQYHCAkKCwwNDg+ukCEMDf0yyQ29NYubggHIVY0sdEUfdyeM+E1LtH1uJgAAAAAAAAAAAAA=");
        assert!(!verify(&hash, b"my password"));
    }

    #[test]
    fn every_truncation_fails_without_panicking() {
        let hash = hash_password(b"pw", &counter_salt());
        for len in 0..hash.len() {
            assert!(!verify(&hash[..len], b"pw"));
        }
    }

    #[test]
    fn parse_exposes_implied_parameters() {
        let hash = hash_password(b"pw", &[3u8; SALT_LEN]);
        let decoded = parse(&hash).unwrap();
        assert_eq!(decoded.format(), Format::V2);
        assert_eq!(decoded.algorithm(), Algorithm::Sha1);
        assert_eq!(decoded.iterations(), 1000);
        assert_eq!(decoded.salt(), &[3u8; SALT_LEN]);
        assert_eq!(decoded.subkey().len(), SUBKEY_LEN);
    }
}
