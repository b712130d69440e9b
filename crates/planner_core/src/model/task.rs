//! Task records and the timestamp format used for `last_modified`.
//!
//! # Invariants
//! - Listing order within a category is important-first, then ascending id.
//! - `last_modified` is local wall-clock time rendered as `YYYY-MM-DD HH:MM`.

use super::category::CategoryId;
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Store-assigned task identifier.
pub type TaskId = i64;

/// Name given to tasks created without one.
pub const DEFAULT_TASK_NAME: &str = "NEW TASK";

/// `strftime` pattern for `last_modified` values.
pub const LAST_MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Listing projection of a task: what the category view shows per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: TaskId,
    pub name: String,
    /// Affects sort order only.
    pub important: bool,
}

/// A category together with its tasks in listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTasks {
    pub category_id: CategoryId,
    pub category_name: String,
    pub tasks: Vec<TaskSummary>,
}

/// Renders `at` in the `last_modified` format.
pub fn format_last_modified<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(LAST_MODIFIED_FORMAT).to_string()
}

/// Current local time in the `last_modified` format.
pub fn current_timestamp() -> String {
    format_last_modified(&Local::now())
}

#[cfg(test)]
mod tests {
    use super::{current_timestamp, format_last_modified};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn format_last_modified_uses_minute_precision() {
        let at = Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(7, 5, 59)
                .unwrap(),
        );
        assert_eq!(format_last_modified(&at), "2024-03-09 07:05");
    }

    #[test]
    fn current_timestamp_has_expected_shape() {
        let stamp = current_timestamp();
        assert_eq!(stamp.len(), 16);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], " ");
        assert_eq!(&stamp[13..14], ":");
    }
}
