//! Error types for mysqlite.

use std::fmt;
use thiserror::Error;

/// The main error type for translation and execution.
#[derive(Debug, Error)]
pub enum Error {
    /// The statement could not be parsed.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// A recognized MySQL construct that has no SQLite equivalent.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// A token failed validation while building SQLite SQL.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// SQLite rejected a statement.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Create an unsupported-construct error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// Create a token validation error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken(message.into())
    }
}

/// SQLite primary result code for `SQLITE_BUSY`.
pub const SQLITE_BUSY: i32 = 5;
/// SQLite primary result code for `SQLITE_LOCKED`.
pub const SQLITE_LOCKED: i32 = 6;

/// An error reported by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageError {
    /// Extended SQLite result code, when the storage reported one.
    pub code: Option<i32>,
    pub message: String,
}

impl StorageError {
    pub fn new(code: Option<i32>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Whether the database was busy or locked. These are retried.
    pub fn is_busy(&self) -> bool {
        matches!(
            self.code.map(|code| code & 0xff),
            Some(SQLITE_BUSY) | Some(SQLITE_LOCKED)
        )
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => {
                let code = db.code().and_then(|code| code.parse::<i32>().ok());
                StorageError::new(code, db.message())
            }
            other => StorageError::new(None, other.to_string()),
        }
    }
}

/// Result type alias for mysqlite operations.
pub type Result<T> = std::result::Result<T, Error>;
