//! Shared Diesel-to-port error mapping for the repositories.

use tracing::debug;

use crate::domain::ports::PersistenceError;

use super::pool::PoolError;

/// Map pool errors onto the connection variant of the persistence port.
pub(super) fn map_pool_error(error: PoolError) -> PersistenceError {
    match error {
        PoolError::Setup { message } | PoolError::Unavailable { message } => {
            PersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors onto the persistence port variants. Unique-key
/// violations become conflicts so services can tell duplicates apart
/// from plain query failures.
pub(super) fn map_diesel_error(error: diesel::result::Error) -> PersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            PersistenceError::conflict(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            PersistenceError::connection("database connection error")
        }
        DieselError::NotFound => PersistenceError::query("record not found"),
        _ => PersistenceError::query("database error"),
    }
}
