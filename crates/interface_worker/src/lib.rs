//! Worker composition root
//!
//! Configuration loading and object-graph wiring for the daily incapacity
//! worker. The `incapacity-worker` binary is a thin shell over this crate:
//! it loads a [`WorkerConfig`], builds a [`WorkerRuntime`] on a PostgreSQL
//! pool, and runs it until a shutdown signal arrives.

pub mod config;
pub mod runtime;

pub use config::WorkerConfig;
pub use runtime::WorkerRuntime;
