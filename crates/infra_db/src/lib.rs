//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL persistence for the incapacity claim
//! system: repository implementations of the domain ports, the connection
//! pool, embedded schema migrations, and the legacy token mapping for rows
//! migrated from the predecessor system.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. Each repository implements one
//! domain port over the shared pool and keeps every multi-row business
//! operation inside a single transaction. Claim row updates are guarded by
//! an optimistic version check.
//!
//! # Legacy Data
//!
//! Enum-like columns are TEXT. Reads decode both the canonical snake_case
//! tokens and the predecessor's Spanish tokens; writes always emit the
//! canonical form, so legacy tokens disappear row by row as data is touched.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool_from_url, run_migrations, PostgresIncapacityRepository};
//!
//! let pool = create_pool_from_url("postgres://localhost/incapacities").await?;
//! run_migrations(&pool).await?;
//! let claims = PostgresIncapacityRepository::new(pool);
//! ```

pub mod error;
pub mod legacy;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{
    create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool, MIGRATOR,
};
pub use repositories::{
    PostgresDocumentRequestRepository, PostgresIncapacityRepository, PostgresNotificationStore,
    PostgresRecipientDirectory,
};
