use sqlx::error::ErrorKind;
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

use crate::application::repos::RepoError;

/// Fixed-width UTC form so that `ORDER BY created_at` on the TEXT column
/// matches chronological order down to the nanosecond.
const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z"
);

pub fn encode_timestamp(value: OffsetDateTime) -> Result<String, RepoError> {
    value
        .to_offset(UtcOffset::UTC)
        .format(TIMESTAMP_FORMAT)
        .map_err(|err| RepoError::InvalidInput {
            message: format!("timestamp cannot be stored: {err}"),
        })
}

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::Database(db) => match db.kind() {
            ErrorKind::UniqueViolation => RepoError::Duplicate {
                constraint: db
                    .constraint()
                    .map(str::to_string)
                    .unwrap_or_else(|| constraint_from_message(db.message())),
            },
            ErrorKind::ForeignKeyViolation => RepoError::InvalidInput {
                message: db.message().to_string(),
            },
            ErrorKind::CheckViolation | ErrorKind::NotNullViolation => RepoError::Integrity {
                message: db.message().to_string(),
            },
            _ if db.message().contains("database is locked") => RepoError::Timeout,
            _ => RepoError::from_persistence(db.message()),
        },
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        other => RepoError::from_persistence(other),
    }
}

/// SQLite reports `UNIQUE constraint failed: table.column[, table.column]`.
fn constraint_from_message(message: &str) -> String {
    message
        .split_once(':')
        .map(|(_, columns)| columns.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
