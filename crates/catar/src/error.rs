use thiserror::Error;

/// Every failure is fatal to the operation in progress: there is no retry,
/// no partial-success reporting and no rollback of entries already written
/// or extracted.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("size mismatch for `{name}`: expected={expected}, actual={actual}")]
    SizeMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },

    #[error("invalid catalog header: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
