use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// A sub-range lies outside the buffer. Raised by the slice helpers;
    /// format decoders report it as `Malformed`.
    Range { start: usize, end: usize, len: usize },
    /// The buffer cannot hold the fields its header declares.
    Malformed(&'static str),
    /// Leading marker byte not handled by any format.
    UnknownFormat(u8),
    UnsupportedAlgorithm(u32),
    /// Decoded parameters are below the accepted strength.
    WeakParameters(String),
    InvalidParams(String),
    /// The secure random source could not produce bytes.
    Entropy(String),
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashError::Range { start, end, len } => {
                write!(f, "range {start}..{end} out of bounds for length {len}")
            }
            HashError::Malformed(what) => write!(f, "malformed hash: {what}"),
            HashError::UnknownFormat(m) => write!(f, "unknown hash format marker {m:#04x}"),
            HashError::UnsupportedAlgorithm(id) => write!(f, "unsupported hash algorithm id {id}"),
            HashError::WeakParameters(why) => write!(f, "hash parameters too weak: {why}"),
            HashError::InvalidParams(why) => write!(f, "invalid parameters: {why}"),
            HashError::Entropy(why) => write!(f, "secure random source unavailable: {why}"),
        }
    }
}

impl std::error::Error for HashError {}
