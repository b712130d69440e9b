//! Planner domain model.
//!
//! # Responsibility
//! - Define the category and task records shared by store and session.
//!
//! # Invariants
//! - Ids are assigned by the store and never reused.
//! - Every task belongs to exactly one category.

pub mod category;
pub mod task;
