use std::{fmt, str::FromStr};

use pbkdf2::pbkdf2_hmac;
use serde::Serialize;
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use zeroize::Zeroizing;

use super::{DEFAULT_ITERATIONS, DEFAULT_SALT_LEN, DEFAULT_SUBKEY_LEN};
use crate::error::HashError;

/// PRF digest used inside PBKDF2-HMAC. The discriminants are the ids
/// written into V3 hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Sha1 = 0,
    Sha256 = 1,
    Sha512 = 2,
}

impl Algorithm {
    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Result<Self, HashError> {
        match id {
            0 => Ok(Algorithm::Sha1),
            1 => Ok(Algorithm::Sha256),
            2 => Ok(Algorithm::Sha512),
            other => Err(HashError::UnsupportedAlgorithm(other)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Sha1 => "sha1",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(Algorithm::Sha1),
            "sha256" => Ok(Algorithm::Sha256),
            "sha512" => Ok(Algorithm::Sha512),
            _ => Err(HashError::InvalidParams(format!("unknown algorithm '{s}'"))),
        }
    }
}

/// Parameters for newly created hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    algorithm: Algorithm,
    iterations: u32,
    salt_len: usize,
    subkey_len: usize,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Sha256,
            iterations: DEFAULT_ITERATIONS,
            salt_len: DEFAULT_SALT_LEN,
            subkey_len: DEFAULT_SUBKEY_LEN,
        }
    }
}

impl KdfParams {
    pub fn new(
        algorithm: Algorithm,
        iterations: u32,
        salt_len: usize,
        subkey_len: usize,
    ) -> Result<Self, HashError> {
        let params = Self {
            algorithm,
            iterations,
            salt_len,
            subkey_len,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn salt_len(&self) -> usize {
        self.salt_len
    }

    pub fn subkey_len(&self) -> usize {
        self.subkey_len
    }

    pub fn validate(&self) -> Result<(), HashError> {
        if self.iterations < 1 {
            return Err(HashError::InvalidParams("iterations must be >= 1".into()));
        }
        if self.salt_len < 1 {
            return Err(HashError::InvalidParams("salt length must be >= 1".into()));
        }
        if u32::try_from(self.salt_len).is_err() {
            return Err(HashError::InvalidParams(
                "salt length does not fit in 32 bits".into(),
            ));
        }
        if self.subkey_len < 1 {
            return Err(HashError::InvalidParams("subkey length must be >= 1".into()));
        }
        Ok(())
    }
}

/// PBKDF2-HMAC over the selected digest, producing `out_len` bytes.
///
/// An iteration count of zero runs a single round, as hashes stored with a
/// zero count were derived that way.
pub fn derive_subkey(
    password: &[u8],
    salt: &[u8],
    algorithm: Algorithm,
    iterations: u32,
    out_len: usize,
) -> Zeroizing<Vec<u8>> {
    let mut out = Zeroizing::new(vec![0u8; out_len]);
    let iterations = iterations.max(1);
    match algorithm {
        Algorithm::Sha1 => pbkdf2_hmac::<Sha1>(password, salt, iterations, &mut out),
        Algorithm::Sha256 => pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out),
        Algorithm::Sha512 => pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut out),
    }
    out
}
