//! Binary password hash formats.
//!
//! Every stored hash starts with a one-byte marker naming its format. The
//! remaining bytes are decoded by that format's module. Markers are never
//! reused: a new layout gets a new marker and a new module.
//!
//! Verification goes through [`crate::verify`] or [`crate::check`]; the
//! per-format handlers are not public, and legacy layouts cannot be written:
//!
//! ```compile_fail
//! let hash = identhash::format::v2::hash_password(b"pw", &[0u8; 16]);
//! ```
//!
//! ```compile_fail
//! let hash = identhash::hash_password("pw").unwrap();
//! let decoded = identhash::format::parse(&hash).unwrap();
//! let again = decoded.rehash(b"pw");
//! ```
//!
//! ```compile_fail
//! let policy = identhash::VerifyPolicy::default();
//! let ok = identhash::format::check(&[0u8; 49], b"pw", &policy);
//! ```

use serde::Serialize;
use tracing::debug;

use crate::crypto::{Algorithm, constant_time_eq};
use crate::error::HashError;
use crate::policy::VerifyPolicy;

pub mod v2;
pub mod v3;

/// Format used for every newly created hash.
pub const CURRENT_FORMAT: Format = Format::V3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Fixed 49-byte legacy layout, PBKDF2-HMAC-SHA1 with 1000 iterations.
    V2,
    /// Self-describing layout carrying algorithm, iterations and salt length.
    V3,
}

impl Format {
    pub fn from_marker(marker: u8) -> Result<Self, HashError> {
        match marker {
            v2::MARKER => Ok(Format::V2),
            v3::MARKER => Ok(Format::V3),
            other => Err(HashError::UnknownFormat(other)),
        }
    }

    pub fn marker(self) -> u8 {
        match self {
            Format::V2 => v2::MARKER,
            Format::V3 => v3::MARKER,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::V2 => f.write_str("v2"),
            Format::V3 => f.write_str("v3"),
        }
    }
}

/// Parameters decoded from a stored hash. Borrows salt and subkey from the
/// input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedHash<'a> {
    format: Format,
    algorithm: Algorithm,
    iterations: u32,
    salt: &'a [u8],
    subkey: &'a [u8],
}

impl<'a> DecodedHash<'a> {
    pub(crate) fn new(
        format: Format,
        algorithm: Algorithm,
        iterations: u32,
        salt: &'a [u8],
        subkey: &'a [u8],
    ) -> Self {
        Self {
            format,
            algorithm,
            iterations,
            salt,
            subkey,
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn salt(&self) -> &'a [u8] {
        self.salt
    }

    pub fn subkey(&self) -> &'a [u8] {
        self.subkey
    }

    /// Re-encodes `password` with these parameters in this format.
    pub(crate) fn rehash(&self, password: &[u8]) -> Result<Vec<u8>, HashError> {
        match self.format {
            Format::V2 => {
                let salt: &[u8; v2::SALT_LEN] = self
                    .salt
                    .try_into()
                    .map_err(|_| HashError::Malformed("v2 salt must be 16 bytes"))?;
                Ok(v2::hash_password(password, salt))
            }
            Format::V3 => v3::rehash(
                password,
                self.salt,
                self.algorithm,
                self.iterations,
                self.subkey.len(),
            ),
        }
    }

    /// Re-derives `password` and compares the result with `stored` in
    /// constant time.
    pub(crate) fn matches(&self, stored: &[u8], password: &[u8]) -> Result<bool, HashError> {
        let actual = zeroize::Zeroizing::new(self.rehash(password)?);
        Ok(constant_time_eq(stored, &actual))
    }
}

/// Parameter summary of a stored hash, safe to print or log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashInfo {
    pub format: Format,
    pub algorithm: Algorithm,
    pub iterations: u32,
    pub salt_len: usize,
    pub subkey_len: usize,
}

impl From<&DecodedHash<'_>> for HashInfo {
    fn from(d: &DecodedHash<'_>) -> Self {
        Self {
            format: d.format,
            algorithm: d.algorithm,
            iterations: d.iterations,
            salt_len: d.salt.len(),
            subkey_len: d.subkey.len(),
        }
    }
}

/// Returns `buf[start..end]`, or `HashError::Range` if the range does not
/// lie within the buffer.
pub fn slice(buf: &[u8], start: usize, end: usize) -> Result<&[u8], HashError> {
    if start > end || end > buf.len() {
        return Err(HashError::Range {
            start,
            end,
            len: buf.len(),
        });
    }
    Ok(&buf[start..end])
}

/// Reads a big-endian `u32` at `offset`.
pub fn read_u32_be(buf: &[u8], offset: usize) -> Result<u32, HashError> {
    let end = offset.checked_add(4).ok_or(HashError::Range {
        start: offset,
        end: usize::MAX,
        len: buf.len(),
    })?;
    let bytes: [u8; 4] = slice(buf, offset, end)?
        .try_into()
        .map_err(|_| HashError::Malformed("u32 field"))?;
    Ok(u32::from_be_bytes(bytes))
}

/// Parses a stored hash, dispatching on its marker byte.
///
/// # Errors
///
/// Returns an error if:
/// - The input is empty
/// - The marker byte is unknown
/// - The selected format cannot decode the remaining bytes
pub fn parse(data: &[u8]) -> Result<DecodedHash<'_>, HashError> {
    let Some(&marker) = data.first() else {
        return Err(HashError::Malformed("empty input"));
    };

    match Format::from_marker(marker)? {
        Format::V2 => v2::parse(data),
        Format::V3 => v3::parse(data),
    }
}

/// Checks `password` against a stored hash of any supported format.
///
/// `Ok(false)` means the hash is well-formed and the password is wrong.
/// Errors describe why the hash could not be trusted.
pub(crate) fn check(
    data: &[u8],
    password: &[u8],
    policy: &VerifyPolicy,
) -> Result<bool, HashError> {
    let result = match data.first() {
        None => Err(HashError::Malformed("empty input")),
        Some(&marker) => match Format::from_marker(marker) {
            Ok(Format::V2) => v2::check(data, password),
            Ok(Format::V3) => v3::check(data, password, policy),
            Err(e) => Err(e),
        },
    };

    if let Err(e) = &result {
        debug!(error = %e, len = data.len(), "rejecting stored hash");
    }
    result
}
