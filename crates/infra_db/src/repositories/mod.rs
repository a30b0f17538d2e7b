//! Repository implementations for domain entities
//!
//! This module provides concrete repository implementations that handle
//! database access for each domain aggregate. Repositories encapsulate
//! SQL queries and map between database rows and domain types.
//!
//! # Architecture
//!
//! Each repository follows these principles:
//! - One transaction per business operation
//! - Optimistic concurrency control on claim rows
//! - Legacy token decoding at the row boundary, canonical tokens on write

pub mod incapacities;
pub mod notifications;
pub mod recipients;
pub mod requests;

pub use incapacities::PostgresIncapacityRepository;
pub use notifications::PostgresNotificationStore;
pub use recipients::PostgresRecipientDirectory;
pub use requests::PostgresDocumentRequestRepository;
