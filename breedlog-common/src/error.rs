//! Common error types for breedlog

use thiserror::Error;

/// Common result type for breedlog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the service crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found (or not owned by the caller)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unique constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map a unique-constraint violation to `Conflict`, leaving other errors as `Database`.
    pub fn from_write(err: sqlx::Error, conflict_message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Error::Conflict(conflict_message.to_string())
            }
            _ => Error::Database(err),
        }
    }
}
