//! PostgreSQL repository implementations.

pub mod share;

use sharegate_core::error::{AppError, ErrorKind};

/// Map a sqlx error onto the application taxonomy.
///
/// Unique violations become `Conflict` (share-code collisions are retried by
/// the registry); connection-level failures become `Unavailable`.
pub(crate) fn map_sqlx(context: &str, err: sqlx::Error) -> AppError {
    let kind = match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => ErrorKind::Conflict,
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => ErrorKind::Unavailable,
        _ => ErrorKind::Internal,
    };
    AppError::with_source(kind, format!("{context}: {err}"), err)
}
