use std::{io, path::PathBuf};

/// Shared error type for protection checks and trash operations.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    /// The source path or the restore target does not exist.
    #[error("no such file or directory: {0}")]
    NotFound(PathBuf),

    /// The restore destination is already occupied.
    #[error("destination already exists: {0}")]
    AlreadyExists(PathBuf),

    /// Classification blocked the operation.
    #[error("BLOCKED: {path}: {reason}")]
    Protected { path: PathBuf, reason: String },

    /// The path is protected and no valid confirmation was supplied.
    #[error("confirmation required for protected path {path}: {reason}")]
    ConfirmationRequired { path: PathBuf, reason: String },

    /// File system I/O failure.
    #[error("I/O error while accessing {0}")]
    Io(PathBuf, #[source] io::Error),

    /// A sidecar exists but does not hold a readable metadata record.
    #[error("corrupt trash metadata in {0}")]
    MetadataCorrupt(PathBuf, #[source] serde_json::Error),

    /// Configuration file or override could not be understood.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CoreError {
    pub fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::Io(path.into(), error)
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn protected(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Protected {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True when the underlying I/O error means the path is missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(_, err) => err.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// True when a rename failed because source and destination live on
    /// different storage volumes.
    pub fn is_cross_device(&self) -> bool {
        matches!(self, Self::Io(_, err) if err.raw_os_error() == Some(libc::EXDEV))
    }

    /// Recommended process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Protected { .. } | Self::ConfirmationRequired { .. } => 2,
            _ => 1,
        }
    }
}

/// Shared result alias for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
