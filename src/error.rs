//! Store error types.

use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Errors raised by the persistence gateway.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The identifier does not resolve to a row.
    #[error("{0} not found")]
    NotFound(String),

    /// A foreign key, check constraint or enumerated value was rejected.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("database error: {0}")]
    Database(DieselError),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("invalid seed data: {0}")]
    Seed(String),

    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(
                kind @ (DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::CheckViolation
                | DatabaseErrorKind::NotNullViolation),
                info,
            ) => {
                let detail = match kind {
                    DatabaseErrorKind::ForeignKeyViolation => "referenced row does not exist",
                    _ => "value rejected by the database",
                };
                StoreError::ConstraintViolation(format!("{} ({})", detail, info.message()))
            }
            other => StoreError::Database(other),
        }
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
