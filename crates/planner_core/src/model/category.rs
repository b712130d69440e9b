//! Category records.

use serde::{Deserialize, Serialize};

/// Store-assigned category identifier.
pub type CategoryId = i64;

/// Name given to categories created without one.
pub const DEFAULT_CATEGORY_NAME: &str = "NEW CATEGORY";

/// A user-defined grouping owning zero or more tasks.
///
/// Names are free text and need not be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}
