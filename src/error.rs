use core::fmt;

/// Result alias for `clustree`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by clustering and index-tree operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The merge queue was asked for a pair while fewer than two clusters
    /// remain active. Callers check `active_count()` first, so hitting this
    /// indicates a defect in the merge loop.
    EmptyQueue,

    /// Nearest-cluster lookup against an index tree with no leaves.
    /// Recoverable: the caller may choose to index a first cluster.
    TreeEmpty,

    /// An index snapshot could not be decoded; nothing was constructed.
    MalformedSnapshot(String),

    /// Point dimensionality mismatch within one batch.
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyQueue => write!(f, "no mergeable cluster pair left in the queue"),
            Error::TreeEmpty => write!(f, "index tree has no leaves"),
            Error::MalformedSnapshot(msg) => write!(f, "malformed index snapshot: {msg}"),
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
        }
    }
}

impl std::error::Error for Error {}
