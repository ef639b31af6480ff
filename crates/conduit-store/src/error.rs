//! Errors raised by `ConnectionStore` implementations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection not found: {0}")]
    NotFound(String),

    #[error("connection already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("transient IO / connection pool error: {0}")]
    TransientIo(String),

    #[error("unknown storage error: {0}")]
    Unknown(String),
}

#[cfg(feature = "pg")]
impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};
        match err {
            DieselError::NotFound => Self::NotFound("row not found".to_string()),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => Self::AlreadyExists(info.message().to_string()),
            DieselError::DatabaseError(kind, info) => Self::Unknown(format!("db error {kind:?}: {}", info.message())),
            other => Self::Unknown(format!("unhandled diesel error: {other:?}")),
        }
    }
}
