//! Database error types
//!
//! Failures inside the adapter are classified here first and only cross the
//! port boundary as `PortError`, so domain code never sees a sqlx type.

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Entity not found in database
    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// Optimistic-lock update matched zero rows
    #[error("{entity} '{id}' was changed concurrently (expected version {expected})")]
    VersionConflict {
        entity: &'static str,
        id: String,
        expected: i64,
    },

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A stored token could not be mapped onto its closed enum
    #[error("Cannot decode column {column}: unknown token '{token}'")]
    Decode { column: &'static str, token: String },

    /// Migration error
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Pool exhaustion, no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Generic SQL error
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates a version conflict error for an optimistic update that missed
    pub fn version_conflict(
        entity: &'static str,
        id: impl std::fmt::Display,
        expected: i64,
    ) -> Self {
        DatabaseError::VersionConflict {
            entity,
            id: id.to_string(),
            expected,
        }
    }

    /// Creates a decode error for an unmappable stored token
    pub fn decode(column: &'static str, token: impl Into<String>) -> Self {
        DatabaseError::Decode {
            column,
            token: token.into(),
        }
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound { .. })
            || matches!(self, DatabaseError::Sql(sqlx::Error::RowNotFound))
    }
}

/// Boundary translation into the shared port taxonomy
///
/// Connection-level failures map to transient variants so callers can use
/// `PortError::is_transient` for retry decisions.
impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound { entity, id } => PortError::not_found(entity, id),
            DatabaseError::VersionConflict { .. } => PortError::conflict(error.to_string()),
            DatabaseError::ConnectionFailed(message) => PortError::connection(message),
            DatabaseError::PoolExhausted => PortError::connection("connection pool exhausted"),
            DatabaseError::Sql(sqlx_error) => from_sqlx(sqlx_error),
            other => PortError::internal(other.to_string()),
        }
    }
}

fn from_sqlx(error: sqlx::Error) -> PortError {
    match &error {
        sqlx::Error::PoolTimedOut => PortError::connection("connection pool timed out"),
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => PortError::connection(error.to_string()),
        _ => PortError::internal(error.to_string()),
    }
}
