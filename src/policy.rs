//! Minimum-strength checks applied to stored hashes before they are trusted.

use crate::crypto::DEFAULT_SUBKEY_LEN;
use crate::error::HashError;

/// Limits a decoded hash must satisfy before the password is re-derived.
///
/// The subkey floor rejects hashes too short to be worth trusting. The
/// optional iteration ceiling bounds the work an attacker-supplied hash can
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyPolicy {
    min_subkey_len: usize,
    max_iterations: Option<u32>,
}

impl Default for VerifyPolicy {
    fn default() -> Self {
        Self {
            min_subkey_len: DEFAULT_SUBKEY_LEN,
            max_iterations: None,
        }
    }
}

impl VerifyPolicy {
    pub fn new(min_subkey_len: usize, max_iterations: Option<u32>) -> Result<Self, HashError> {
        let policy = Self {
            min_subkey_len,
            max_iterations,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn min_subkey_len(&self) -> usize {
        self.min_subkey_len
    }

    pub fn max_iterations(&self) -> Option<u32> {
        self.max_iterations
    }

    pub fn validate(&self) -> Result<(), HashError> {
        if self.min_subkey_len < 1 {
            return Err(HashError::InvalidParams(
                "minimum subkey length must be >= 1".into(),
            ));
        }
        if self.max_iterations == Some(0) {
            return Err(HashError::InvalidParams(
                "maximum iterations must be >= 1".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn check_subkey_len(&self, subkey_len: usize) -> Result<(), HashError> {
        if subkey_len < self.min_subkey_len {
            return Err(HashError::WeakParameters(format!(
                "subkey is {subkey_len} bytes, at least {} required",
                self.min_subkey_len
            )));
        }
        Ok(())
    }

    pub(crate) fn check_iterations(&self, iterations: u32) -> Result<(), HashError> {
        match self.max_iterations {
            Some(max) if iterations > max => Err(HashError::WeakParameters(format!(
                "{iterations} iterations exceed the configured maximum of {max}"
            ))),
            _ => Ok(()),
        }
    }
}
