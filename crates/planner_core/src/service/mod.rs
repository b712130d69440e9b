//! Front-end facing services.
//!
//! # Responsibility
//! - Hold selection/editing state on top of the store.
//! - Provide the deferred-action primitive used for debounced writes.

pub mod deferred;
pub mod session;
