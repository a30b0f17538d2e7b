//! Core Kernel - Foundational types and utilities for the incapacity system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Strongly-typed identifiers for every entity
//! - The business-day calendar used for all deadline arithmetic
//! - Port infrastructure (error taxonomy, clock) shared by the domain crates

pub mod calendar;
pub mod identifiers;
pub mod ports;

pub use calendar::{BusinessCalendar, long_date};
pub use identifiers::{
    IncapacityId, EmployeeId, DocumentRequestId, TransitionId,
    NotificationId, DocumentId,
};
pub use ports::{Clock, DomainPort, PortError, SystemClock};
