//! Hash format v3.
//!
//! V3 Format (integers big-endian):
//! ```text
//! MARKER = 0x01 (1) | ALGORITHM (4) | ITERATIONS (4) | SALT_LEN (4) | SALT (SALT_LEN) | SUBKEY
//! ```
//!
//! The subkey runs to the end of the buffer, so its length is implied by
//! the total length.

use super::{DecodedHash, Format, read_u32_be, slice};
use crate::crypto::{Algorithm, derive_subkey};
use crate::error::HashError;
use crate::policy::VerifyPolicy;

pub const MARKER: u8 = 1;

const ALG_OFFSET: usize = 1;
const ITER_OFFSET: usize = 5;
const SALT_LEN_OFFSET: usize = 9;

/// Length of the fixed header preceding the salt.
pub const HEADER_LEN: usize = 13;

/// Hashes `password` into a v3 blob.
///
/// # Errors
///
/// Returns an error if `iterations` or `out_len` is zero, or the salt is too
/// long for its 32-bit length field.
pub fn hash_password(
    password: &[u8],
    salt: &[u8],
    algorithm: Algorithm,
    iterations: u32,
    out_len: usize,
) -> Result<Vec<u8>, HashError> {
    if iterations == 0 {
        return Err(HashError::InvalidParams("iterations must be >= 1".into()));
    }
    if out_len == 0 {
        return Err(HashError::InvalidParams("subkey length must be >= 1".into()));
    }
    let salt_len = u32::try_from(salt.len())
        .map_err(|_| HashError::InvalidParams("salt length does not fit in 32 bits".into()))?;

    Ok(encode(password, salt, salt_len, algorithm, iterations, out_len))
}

/// Re-derives a stored hash. Parameters come from a decoded blob and are
/// not re-validated, so legacy blobs with an iteration count of zero still
/// reproduce.
pub(crate) fn rehash(
    password: &[u8],
    salt: &[u8],
    algorithm: Algorithm,
    iterations: u32,
    out_len: usize,
) -> Result<Vec<u8>, HashError> {
    let salt_len =
        u32::try_from(salt.len()).map_err(|_| HashError::Malformed("salt length overflows"))?;
    Ok(encode(password, salt, salt_len, algorithm, iterations, out_len))
}

fn encode(
    password: &[u8],
    salt: &[u8],
    salt_len: u32,
    algorithm: Algorithm,
    iterations: u32,
    out_len: usize,
) -> Vec<u8> {
    let subkey = derive_subkey(password, salt, algorithm, iterations, out_len);

    let mut buf = Vec::with_capacity(HEADER_LEN + salt.len() + out_len);
    buf.push(MARKER);
    buf.extend_from_slice(&algorithm.id().to_be_bytes());
    buf.extend_from_slice(&iterations.to_be_bytes());
    buf.extend_from_slice(&salt_len.to_be_bytes());
    buf.extend_from_slice(salt);
    buf.extend_from_slice(&subkey);
    buf
}

/// Parses a v3 hash.
///
/// # Errors
///
/// Returns an error if:
/// - The marker is wrong or the header is truncated
/// - The declared salt runs past the end of the buffer
/// - The algorithm id is unknown
///
/// An iteration count of zero is accepted and derives like a single round.
pub fn parse(data: &[u8]) -> Result<DecodedHash<'_>, HashError> {
    if data.first() != Some(&MARKER) {
        return Err(HashError::Malformed("not a v3 hash"));
    }

    let truncated = |_| HashError::Malformed("truncated v3 header");
    let algorithm = Algorithm::from_id(read_u32_be(data, ALG_OFFSET).map_err(truncated)?)?;
    let iterations = read_u32_be(data, ITER_OFFSET).map_err(truncated)?;
    let salt_len = usize::try_from(read_u32_be(data, SALT_LEN_OFFSET).map_err(truncated)?)
        .map_err(|_| HashError::Malformed("salt length overflows"))?;

    let salt_end = HEADER_LEN
        .checked_add(salt_len)
        .ok_or(HashError::Malformed("salt length overflows"))?;

    let salt = slice(data, HEADER_LEN, salt_end)
        .map_err(|_| HashError::Malformed("salt runs past end of hash"))?;
    let subkey = slice(data, salt_end, data.len())
        .map_err(|_| HashError::Malformed("subkey out of range"))?;

    Ok(DecodedHash::new(
        Format::V3,
        algorithm,
        iterations,
        salt,
        subkey,
    ))
}

pub(crate) fn check(data: &[u8], password: &[u8], policy: &VerifyPolicy) -> Result<bool, HashError> {
    let decoded = parse(data)?;
    policy.check_subkey_len(decoded.subkey().len())?;
    policy.check_iterations(decoded.iterations())?;
    decoded.matches(data, password)
}
