//! Persistence layer for categories and tasks.
//!
//! # Responsibility
//! - Define the store contract used by the session.
//! - Keep SQL inside the core persistence boundary.

pub mod store;
