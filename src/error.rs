use thiserror::Error;

/// Unified error type for changeflow operations
#[derive(Error, Debug)]
pub enum ChangeflowError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Change record error: {0}")]
    Record(String),

    #[error("Version pattern error: {0}")]
    Pattern(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Command execution failed: {0}")]
    Command(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in changeflow
pub type Result<T> = std::result::Result<T, ChangeflowError>;

impl ChangeflowError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ChangeflowError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ChangeflowError::Version(msg.into())
    }

    /// Create a change record error with context
    pub fn record(msg: impl Into<String>) -> Self {
        ChangeflowError::Record(msg.into())
    }

    /// Create a version pattern error with context
    pub fn pattern(msg: impl Into<String>) -> Self {
        ChangeflowError::Pattern(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        ChangeflowError::Tag(msg.into())
    }

    /// Create a command execution error with context
    pub fn command(msg: impl Into<String>) -> Self {
        ChangeflowError::Command(msg.into())
    }
}
