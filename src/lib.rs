//! Versioned, self-describing PBKDF2 password hashes.
//!
//! New hashes are always written in the current format (v3). Verification
//! dispatches on the leading marker byte, so hashes written by older formats
//! keep verifying after an upgrade.
//!
//! ```
//! let hash = identhash::hash_password("hunter2").unwrap();
//! assert!(identhash::verify(&hash, "hunter2"));
//! assert!(!identhash::verify(&hash, "hunter3"));
//! ```

pub mod crypto;
mod error;
pub mod format;
mod policy;

pub use crate::crypto::{Algorithm, KdfParams, OsRandom, SaltSource, generate_salt};
pub use crate::error::HashError;
pub use crate::format::{CURRENT_FORMAT, DecodedHash, Format, HashInfo};
pub use crate::policy::VerifyPolicy;

use tracing::debug;
use zeroize::Zeroizing;

/// Hashes `password` in the current format with default parameters and a
/// salt from the OS random generator.
pub fn hash_password(password: impl AsRef<[u8]>) -> Result<Vec<u8>, HashError> {
    hash_password_with(password, &KdfParams::default(), &mut OsRandom)
}

/// Hashes `password` in the current format with `params`, drawing the salt
/// from `source`.
pub fn hash_password_with<S: SaltSource + ?Sized>(
    password: impl AsRef<[u8]>,
    params: &KdfParams,
    source: &mut S,
) -> Result<Vec<u8>, HashError> {
    params.validate()?;
    let salt = Zeroizing::new(crypto::generate_salt_with(source, params.salt_len())?);

    format::v3::hash_password(
        password.as_ref(),
        &salt,
        params.algorithm(),
        params.iterations(),
        params.subkey_len(),
    )
}

/// Checks `password` against a stored hash of any supported format.
///
/// Returns `Ok(true)` on a match and `Ok(false)` for a wrong password. An
/// error means the stored hash is malformed, of an unknown format, or too
/// weak for `policy`.
pub fn check(
    hashed: &[u8],
    password: impl AsRef<[u8]>,
    policy: &VerifyPolicy,
) -> Result<bool, HashError> {
    format::check(hashed, password.as_ref(), policy)
}

/// Verifies `password` against a stored hash using the default policy.
///
/// Never panics on malformed input; anything other than a match is `false`.
pub fn verify(hashed: &[u8], password: impl AsRef<[u8]>) -> bool {
    verify_with_policy(hashed, password, &VerifyPolicy::default())
}

pub fn verify_with_policy(
    hashed: &[u8],
    password: impl AsRef<[u8]>,
    policy: &VerifyPolicy,
) -> bool {
    check(hashed, password, policy).unwrap_or(false)
}

/// Returns `true` if `hashed` should be replaced by a fresh hash made with
/// `params`: it is unreadable, in an older format, or uses other parameters.
pub fn needs_rehash(hashed: &[u8], params: &KdfParams) -> bool {
    let decoded = match format::parse(hashed) {
        Ok(d) => d,
        Err(e) => {
            debug!(error = %e, "stored hash unreadable, rehash required");
            return true;
        }
    };

    decoded.format() != CURRENT_FORMAT
        || decoded.algorithm() != params.algorithm()
        || decoded.iterations() != params.iterations()
        || decoded.salt().len() != params.salt_len()
        || decoded.subkey().len() != params.subkey_len()
}

/// Describes the parameters of a stored hash without verifying it.
pub fn inspect(hashed: &[u8]) -> Result<HashInfo, HashError> {
    format::parse(hashed).map(|d| HashInfo::from(&d))
}

/// Hashing front end bundling creation parameters, verification policy and
/// salt source.
#[derive(Debug, Clone, Default)]
pub struct Hasher<S = OsRandom> {
    params: KdfParams,
    policy: VerifyPolicy,
    source: S,
}

impl Hasher<OsRandom> {
    pub fn new(params: KdfParams) -> Result<Self, HashError> {
        Self::with_salt_source(params, OsRandom)
    }
}

impl<S: SaltSource> Hasher<S> {
    pub fn with_salt_source(params: KdfParams, source: S) -> Result<Self, HashError> {
        params.validate()?;
        Ok(Self {
            params,
            policy: VerifyPolicy::default(),
            source,
        })
    }

    pub fn with_policy(mut self, policy: VerifyPolicy) -> Result<Self, HashError> {
        policy.validate()?;
        self.policy = policy;
        Ok(self)
    }

    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    pub fn policy(&self) -> &VerifyPolicy {
        &self.policy
    }

    pub fn hash(&mut self, password: impl AsRef<[u8]>) -> Result<Vec<u8>, HashError> {
        hash_password_with(password, &self.params, &mut self.source)
    }

    pub fn check(&self, hashed: &[u8], password: impl AsRef<[u8]>) -> Result<bool, HashError> {
        check(hashed, password, &self.policy)
    }

    pub fn verify(&self, hashed: &[u8], password: impl AsRef<[u8]>) -> bool {
        verify_with_policy(hashed, password, &self.policy)
    }

    pub fn needs_rehash(&self, hashed: &[u8]) -> bool {
        needs_rehash(hashed, &self.params)
    }
}

#[cfg(test)]
mod tests {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    use super::*;
    use crate::crypto::random::tests::{Counter, Exhausted};

    const SUCCESS_V2: &str = "ANXrDknc7fGPpigibZXXZFMX4aoqz44JveK6jQuwY3eH/UyPhvr5xTPeGYEckLxz9A==";
    const SUCCESS_V3: &str =
        "AQAAAAEAACcQAAAAEAABAgMEBQYHCAkKCwwNDg+yWU7rLgUwPZb1Itsmra7cbxw2EFpwpVFIEtP+JIuUEw==";

    fn b64(s: &str) -> Vec<u8> {
        STANDARD.decode(s).unwrap()
    }

    fn fast_params() -> KdfParams {
        KdfParams::new(Algorithm::Sha256, 10, 16, 32).unwrap()
    }

    #[test]
    fn verify_known_vectors() {
        assert!(verify(&b64(SUCCESS_V2), "my password"));
        assert!(verify(&b64(SUCCESS_V3), "my password"));
    }

    #[test]
    fn verify_empty_hash_fails() {
        assert!(!verify(&[], "my password"));
        assert!(!verify(&[], ""));
    }

    #[test]
    fn verify_unknown_marker_fails() {
        let mut hash = b64(SUCCESS_V2);
        hash[0] = 0xA4;
        assert!(!verify(&hash, "my password"));
        assert_eq!(
            check(&hash, "my password", &VerifyPolicy::default()),
            Err(HashError::UnknownFormat(0xA4))
        );

        let invalid = b64("AtXrDknc7fGPpigibZXXZFMX4aoqz44JveK6jQuwY3eH/UyPhvr5xTPeGYEckLxz9A==");
        assert!(!verify(&invalid, "my password"));
    }

    #[test]
    fn marker_selects_the_decoder() {
        // A v2 body relabelled as v3 must not verify through the v2 path.
        let mut hash = b64(SUCCESS_V2);
        hash[0] = format::v3::MARKER;
        assert!(!verify(&hash, "my password"));
    }

    #[test]
    fn roundtrip_across_algorithms() {
        for alg in [Algorithm::Sha1, Algorithm::Sha256, Algorithm::Sha512] {
            let params = KdfParams::new(alg, 5, 24, 48).unwrap();
            let hash = hash_password_with("correct horse", &params, &mut OsRandom).unwrap();
            assert_eq!(hash[0], CURRENT_FORMAT.marker());
            assert!(verify(&hash, "correct horse"));
            assert!(!verify(&hash, "correct h0rse"));
        }
    }

    #[test]
    fn default_hash_roundtrip() {
        let hash = hash_password("pw").unwrap();
        assert_eq!(inspect(&hash).unwrap().algorithm, Algorithm::Sha256);
        assert!(verify(&hash, "pw"));
    }

    #[test]
    fn injected_salt_source_gives_reproducible_hash() {
        let params = KdfParams::new(Algorithm::Sha256, 10_000, 16, 32).unwrap();
        let hash = hash_password_with("my password", &params, &mut Counter(0)).unwrap();
        assert_eq!(hash, b64(SUCCESS_V3));
    }

    #[test]
    fn entropy_failure_surfaces_as_error() {
        assert!(matches!(
            hash_password_with("pw", &fast_params(), &mut Exhausted),
            Err(HashError::Entropy(_))
        ));
    }

    #[test]
    fn needs_rehash_flags_legacy_and_changed_params() {
        let params = fast_params();
        let current = hash_password_with("pw", &params, &mut OsRandom).unwrap();

        assert!(!needs_rehash(&current, &params));
        assert!(needs_rehash(&b64(SUCCESS_V2), &params));
        assert!(needs_rehash(
            &current,
            &KdfParams::new(Algorithm::Sha256, 11, 16, 32).unwrap()
        ));
        assert!(needs_rehash(&[], &params));
    }

    #[test]
    fn inspect_reports_format() {
        let info = inspect(&b64(SUCCESS_V2)).unwrap();
        assert_eq!(info.format, Format::V2);
        assert_eq!(info.iterations, 1000);
        assert!(inspect(&[7]).is_err());
    }

    #[test]
    fn hasher_uses_its_policy() {
        let params = KdfParams::new(Algorithm::Sha512, 10, 16, 16).unwrap();
        let mut strict = Hasher::new(params).unwrap();
        let hash = strict.hash("pw").unwrap();
        assert!(!strict.verify(&hash, "pw"));

        let mut relaxed = Hasher::with_salt_source(params, Counter(0))
            .unwrap()
            .with_policy(VerifyPolicy::new(16, Some(100)).unwrap())
            .unwrap();
        let hash = relaxed.hash("pw").unwrap();
        assert!(relaxed.verify(&hash, "pw"));
        assert_eq!(relaxed.check(&hash, "nope"), Ok(false));
        assert!(!relaxed.needs_rehash(&hash));
    }

    #[test]
    fn verify_is_usable_from_many_threads() {
        let hash = b64(SUCCESS_V3);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| assert!(verify(&hash, "my password")));
            }
        });
    }
}
