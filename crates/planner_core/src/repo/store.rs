//! Category/task store contract and its SQLite implementation.
//!
//! # Responsibility
//! - Own the database connection for the lifetime of the application.
//! - Provide every read and write over `categories` and `tasks`.
//!
//! # Invariants
//! - Every mutating call commits before returning.
//! - Reads of absent ids return defaults; writes to absent ids are no-ops.
//! - Deleting a category removes its tasks in the same transaction, so no
//!   store-mediated delete leaves a task pointing at a missing category.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::category::{Category, CategoryId, DEFAULT_CATEGORY_NAME};
use crate::model::task::{current_timestamp, TaskId, TaskSummary, DEFAULT_TASK_NAME};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-engine failure surfaced by store operations.
///
/// Missing rows are never reported through this type.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistent category/task operations.
pub trait Store {
    /// All categories in creation order.
    fn list_categories(&self) -> StoreResult<Vec<Category>>;
    /// Tasks of one category, important first, then by id.
    fn list_tasks(&self, category_id: CategoryId) -> StoreResult<Vec<TaskSummary>>;
    /// Task body, or `""` when the task is absent.
    fn task_content(&self, task_id: TaskId) -> StoreResult<String>;
    /// Task timestamp, or `""` when the task is absent or was never stamped.
    fn task_last_modified(&self, task_id: TaskId) -> StoreResult<String>;
    /// Importance flag, or `false` when the task is absent.
    fn task_important(&self, task_id: TaskId) -> StoreResult<bool>;
    fn task_exists(&self, task_id: TaskId) -> StoreResult<bool>;
    fn add_category(&self, name: &str) -> StoreResult<CategoryId>;
    /// Creates a task and stamps its `last_modified`.
    ///
    /// The category is not checked; a task under a missing category is
    /// stored but never listed.
    fn add_task(&self, category_id: CategoryId, name: &str) -> StoreResult<TaskId>;
    fn update_category_name(&self, category_id: CategoryId, name: &str) -> StoreResult<()>;
    fn update_task_name(&self, task_id: TaskId, name: &str) -> StoreResult<()>;
    fn update_task_content(&self, task_id: TaskId, content: &str) -> StoreResult<()>;
    fn set_task_important(&self, task_id: TaskId, important: bool) -> StoreResult<()>;
    fn update_task_last_modified(&self, task_id: TaskId, timestamp: &str) -> StoreResult<()>;
    fn delete_task(&self, task_id: TaskId) -> StoreResult<()>;
    /// Deletes a category and all of its tasks as one atomic unit.
    fn delete_category_and_tasks(&self, category_id: CategoryId) -> StoreResult<()>;
    /// Confirms everything written so far is durable.
    fn flush(&self) -> StoreResult<()>;

    fn add_default_category(&self) -> StoreResult<CategoryId> {
        self.add_category(DEFAULT_CATEGORY_NAME)
    }

    fn add_default_task(&self, category_id: CategoryId) -> StoreResult<TaskId> {
        self.add_task(category_id, DEFAULT_TASK_NAME)
    }
}

/// SQLite-backed store owning its connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (creating and migrating as needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens a throwaway in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Borrow of the underlying connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the connection, reporting any failure to release it.
    pub fn close(self) -> StoreResult<()> {
        self.conn.close().map_err(|(_, err)| StoreError::from(err))?;
        info!("event=store_close module=store status=ok");
        Ok(())
    }
}

impl Store for SqliteStore {
    fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories ORDER BY id ASC;")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: row.get("id")?,
                name: row.get("name")?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn list_tasks(&self, category_id: CategoryId) -> StoreResult<Vec<TaskSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, important
             FROM tasks
             WHERE category_id = ?1
             ORDER BY important DESC, id ASC;",
        )?;
        let rows = stmt.query_map([category_id], |row| {
            Ok(TaskSummary {
                id: row.get("id")?,
                name: row.get("name")?,
                important: row.get::<_, Option<i64>>("important")?.unwrap_or(0) != 0,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn task_content(&self, task_id: TaskId) -> StoreResult<String> {
        let content: Option<Option<String>> = self
            .conn
            .query_row("SELECT content FROM tasks WHERE id = ?1;", [task_id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(content.flatten().unwrap_or_default())
    }

    fn task_last_modified(&self, task_id: TaskId) -> StoreResult<String> {
        let last_modified: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT last_modified FROM tasks WHERE id = ?1;",
                [task_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(last_modified.flatten().unwrap_or_default())
    }

    fn task_important(&self, task_id: TaskId) -> StoreResult<bool> {
        let important: Option<Option<i64>> = self
            .conn
            .query_row(
                "SELECT important FROM tasks WHERE id = ?1;",
                [task_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(important.flatten().unwrap_or(0) != 0)
    }

    fn task_exists(&self, task_id: TaskId) -> StoreResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM tasks WHERE id = ?1;", [task_id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn add_category(&self, name: &str) -> StoreResult<CategoryId> {
        self.conn
            .execute("INSERT INTO categories (name) VALUES (?1);", [name])?;
        let id = self.conn.last_insert_rowid();
        debug!("event=category_add module=store status=ok category_id={id}");
        Ok(id)
    }

    fn add_task(&self, category_id: CategoryId, name: &str) -> StoreResult<TaskId> {
        self.conn.execute(
            "INSERT INTO tasks (category_id, name, last_modified) VALUES (?1, ?2, ?3);",
            params![category_id, name, current_timestamp()],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("event=task_add module=store status=ok category_id={category_id} task_id={id}");
        Ok(id)
    }

    fn update_category_name(&self, category_id: CategoryId, name: &str) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE categories SET name = ?1 WHERE id = ?2;",
            params![name, category_id],
        )?;
        debug!(
            "event=category_rename module=store status=ok category_id={category_id} changed={changed}"
        );
        Ok(())
    }

    fn update_task_name(&self, task_id: TaskId, name: &str) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET name = ?1 WHERE id = ?2;",
            params![name, task_id],
        )?;
        debug!("event=task_rename module=store status=ok task_id={task_id} changed={changed}");
        Ok(())
    }

    fn update_task_content(&self, task_id: TaskId, content: &str) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET content = ?1 WHERE id = ?2;",
            params![content, task_id],
        )?;
        debug!(
            "event=task_content_save module=store status=ok task_id={task_id} chars={} changed={changed}",
            content.chars().count()
        );
        Ok(())
    }

    fn set_task_important(&self, task_id: TaskId, important: bool) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET important = ?1 WHERE id = ?2;",
            params![bool_to_int(important), task_id],
        )?;
        debug!(
            "event=task_important module=store status=ok task_id={task_id} important={important} changed={changed}"
        );
        Ok(())
    }

    fn update_task_last_modified(&self, task_id: TaskId, timestamp: &str) -> StoreResult<()> {
        self.conn.execute(
            "UPDATE tasks SET last_modified = ?1 WHERE id = ?2;",
            params![timestamp, task_id],
        )?;
        Ok(())
    }

    fn delete_task(&self, task_id: TaskId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [task_id])?;
        debug!("event=task_delete module=store status=ok task_id={task_id} changed={changed}");
        Ok(())
    }

    fn delete_category_and_tasks(&self, category_id: CategoryId) -> StoreResult<()> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let removed_tasks = tx.execute("DELETE FROM tasks WHERE category_id = ?1;", [category_id])?;
        let removed_categories =
            tx.execute("DELETE FROM categories WHERE id = ?1;", [category_id])?;
        tx.commit()?;

        info!(
            "event=category_delete module=store status=ok category_id={} removed_categories={} removed_tasks={}",
            category_id, removed_categories, removed_tasks
        );
        Ok(())
    }

    fn flush(&self) -> StoreResult<()> {
        // Writes run in autocommit mode; an open transaction here means a
        // caller left one behind.
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT;")?;
        }
        info!("event=store_flush module=store status=ok");
        Ok(())
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
