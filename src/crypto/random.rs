use getrandom::fill;

use crate::error::HashError;

/// Source of salt bytes. Implementations must be cryptographically secure.
pub trait SaltSource {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), HashError>;
}

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl SaltSource for OsRandom {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), HashError> {
        fill(buf).map_err(|e| HashError::Entropy(e.to_string()))
    }
}

/// Generate a salt of `len` bytes from the OS random generator
pub fn generate_salt(len: usize) -> Result<Vec<u8>, HashError> {
    generate_salt_with(&mut OsRandom, len)
}

/// Generate a salt of `len` bytes from `source`
pub fn generate_salt_with<S: SaltSource + ?Sized>(
    source: &mut S,
    len: usize,
) -> Result<Vec<u8>, HashError> {
    let mut salt = vec![0u8; len];
    source.fill(&mut salt)?;
    Ok(salt)
}
