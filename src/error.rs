use std::fmt;

/// Invariant violations and I/O failures surfaced across the engine's API boundaries.
///
/// `DimensionMismatch` and `NonNormalizedStrategy` signal a buggy game definition or a corrupted
/// checkpoint; callers should treat them as unrecoverable. `Io` and `Descriptor` are expected to
/// occur in the field (disk full, truncated file) and are meant to be logged and retried on the
/// next checkpoint cycle.
#[derive(Debug)]
pub enum McrError {
    DimensionMismatch { infoset: usize, expected: usize, got: usize },
    NonNormalizedStrategy { infoset: usize, sum: f64 },
    Io(std::io::Error),
    Descriptor(String),
}

impl fmt::Display for McrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { infoset, expected, got } => write!(
                f,
                "infoset {infoset}: dimension mismatch, expected {expected} legal actions, got {got}"
            ),
            Self::NonNormalizedStrategy { infoset, sum } => write!(
                f,
                "infoset {infoset}: strategy row sums to {sum}, expected 1 within 1e-5"
            ),
            Self::Io(e) => write!(f, "I/O failure: {e}"),
            Self::Descriptor(msg) => write!(f, "descriptor parse error: {msg}"),
        }
    }
}

impl std::error::Error for McrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for McrError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

pub type McrResult<T> = Result<T, McrError>;
