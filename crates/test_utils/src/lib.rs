//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! incapacity system test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for common entities
//! - `builders`: Builder patterns for test data construction
//! - `clock`: Controllable clock for deadline arithmetic
//! - `memory`: In-memory implementations of the persistence ports
//! - `transport`: Scripted mail transport double
//! - `database`: Database test helpers and container management

pub mod builders;
pub mod clock;
pub mod database;
pub mod fixtures;
pub mod memory;
pub mod transport;

pub use builders::*;
pub use clock::*;
pub use database::*;
pub use fixtures::*;
pub use memory::*;
pub use transport::*;

use once_cell::sync::Lazy;

static TRACING: Lazy<()> = Lazy::new(|| {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .init();
});

/// Initializes tracing once for the whole test binary
///
/// Quiet by default; set `RUST_LOG` to see component logs while a test
/// runs.
pub fn init_tracing() {
    Lazy::force(&TRACING);
}
