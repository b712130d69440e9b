//! Selection and editing state over a store.
//!
//! # Responsibility
//! - Track the selected category or task and mirror store content into
//!   editor fields.
//! - Turn user actions into store calls, re-reading the category/task
//!   snapshot after each mutation.
//! - Debounce passive content edits into single writes.
//!
//! # Invariants
//! - At most one of category and task is selected.
//! - Loading a task into the editor never schedules a write; only
//!   `edit_content` does.
//! - A pending content write always targets the task that was selected when
//!   the edit happened: it is written before the selection moves away or a
//!   category is deleted, and dropped when that task alone is deleted.

use crate::model::category::CategoryId;
use crate::model::task::{current_timestamp, CategoryTasks, TaskId};
use crate::repo::store::{Store, StoreResult};
use crate::service::deferred::DeferredAction;
use crate::settings::PlannerSettings;
use log::debug;
use std::time::{Duration, Instant};

/// Editor title shown when a selected task cannot be found in any category.
pub const FALLBACK_TASK_TITLE: &str = "TASK";

/// Text shown in the save confirmation.
pub const SAVED_NOTICE_TEXT: &str = "Saved!";

/// Editable fields of the detail pane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    pub title: String,
    pub content: String,
    /// `None` hides the last-modified line.
    pub last_modified: Option<String>,
}

/// What a call to [`PlannerSession::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickEvents {
    pub content_saved: bool,
    pub notice_hidden: bool,
}

/// Session state for one running front end.
pub struct PlannerSession<S: Store> {
    store: S,
    categories: Vec<CategoryTasks>,
    selected_category: Option<CategoryId>,
    selected_task: Option<TaskId>,
    editor: EditorState,
    content_save: DeferredAction,
    saved_notice: DeferredAction,
    saved_notice_visible: bool,
    saved_this_session: bool,
}

impl<S: Store> PlannerSession<S> {
    /// Creates a session and loads the initial category/task snapshot.
    pub fn new(
        store: S,
        content_save_delay: Duration,
        saved_notice_duration: Duration,
    ) -> StoreResult<Self> {
        let mut session = Self {
            store,
            categories: Vec::new(),
            selected_category: None,
            selected_task: None,
            editor: EditorState::default(),
            content_save: DeferredAction::new(content_save_delay),
            saved_notice: DeferredAction::new(saved_notice_duration),
            saved_notice_visible: false,
            saved_this_session: false,
        };
        session.reload()?;
        Ok(session)
    }

    pub fn with_settings(store: S, settings: &PlannerSettings) -> StoreResult<Self> {
        Self::new(
            store,
            settings.content_save_delay(),
            settings.saved_notice_duration(),
        )
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every category with its tasks, as of the last reload.
    pub fn categories(&self) -> &[CategoryTasks] {
        &self.categories
    }

    pub fn selected_category(&self) -> Option<CategoryId> {
        self.selected_category
    }

    pub fn selected_task(&self) -> Option<TaskId> {
        self.selected_task
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    /// Whether the "delete category" control should be offered.
    pub fn category_delete_available(&self) -> bool {
        self.selected_category.is_some()
    }

    /// Whether the "delete task" control should be offered.
    pub fn task_delete_available(&self) -> bool {
        self.selected_task.is_some()
    }

    pub fn saved_notice(&self) -> Option<&'static str> {
        self.saved_notice_visible.then_some(SAVED_NOTICE_TEXT)
    }

    pub fn has_pending_content_save(&self) -> bool {
        self.content_save.is_pending()
    }

    /// Advisory: `true` until the user saved explicitly this session.
    pub fn needs_exit_prompt(&self) -> bool {
        !self.saved_this_session
    }

    /// Re-reads every category and its tasks from the store.
    pub fn reload(&mut self) -> StoreResult<()> {
        let categories = self.store.list_categories()?;
        let mut snapshot = Vec::with_capacity(categories.len());
        for category in categories {
            let tasks = self.store.list_tasks(category.id)?;
            snapshot.push(CategoryTasks {
                category_id: category.id,
                category_name: category.name,
                tasks,
            });
        }
        self.categories = snapshot;
        Ok(())
    }

    pub fn select_category(&mut self, category_id: CategoryId) -> StoreResult<()> {
        self.flush_pending_content()?;
        self.selected_category = Some(category_id);
        self.selected_task = None;
        self.editor = EditorState::default();
        debug!("event=select_category module=session status=ok category_id={category_id}");
        Ok(())
    }

    /// Selects a task and loads it into the editor.
    ///
    /// The title comes from a scan over every category's tasks, so a task
    /// whose category is gone gets [`FALLBACK_TASK_TITLE`].
    pub fn select_task(&mut self, task_id: TaskId) -> StoreResult<()> {
        self.flush_pending_content()?;
        self.selected_task = Some(task_id);
        self.selected_category = None;

        let title = self.find_task_name(task_id)?;
        let found = title.is_some();
        self.editor = EditorState {
            title: title.unwrap_or_else(|| FALLBACK_TASK_TITLE.to_string()),
            content: self.store.task_content(task_id)?,
            last_modified: Some(self.store.task_last_modified(task_id)?),
        };
        debug!("event=select_task module=session status=ok task_id={task_id} found={found}");
        Ok(())
    }

    pub fn add_category(&mut self) -> StoreResult<CategoryId> {
        let id = self.store.add_default_category()?;
        self.reload()?;
        Ok(id)
    }

    pub fn add_task(&mut self, category_id: CategoryId) -> StoreResult<TaskId> {
        let id = self.store.add_default_task(category_id)?;
        self.reload()?;
        Ok(id)
    }

    /// Renames a category; blank input keeps the old name and returns `false`.
    pub fn rename_category(&mut self, category_id: CategoryId, name: &str) -> StoreResult<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        self.store.update_category_name(category_id, name)?;
        self.reload()?;
        Ok(true)
    }

    /// Renames a task; blank input keeps the old name and returns `false`.
    pub fn rename_task(&mut self, task_id: TaskId, name: &str) -> StoreResult<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        self.store.update_task_name(task_id, name)?;
        if self.selected_task == Some(task_id) {
            self.editor.title = name.to_string();
        }
        self.reload()?;
        Ok(true)
    }

    /// Flips the importance flag and persists it immediately.
    ///
    /// Returns the new flag value.
    pub fn toggle_important(&mut self, task_id: TaskId) -> StoreResult<bool> {
        let important = !self.store.task_important(task_id)?;
        self.store.set_task_important(task_id, important)?;
        self.reload()?;
        Ok(important)
    }

    /// Replaces the editor content and restarts the save debounce.
    pub fn edit_content(&mut self, content: impl Into<String>, now: Instant) {
        self.editor.content = content.into();
        if self.selected_task.is_some() {
            self.content_save.start(now);
        }
    }

    /// Fires whichever deferred actions are due at `now`.
    pub fn tick(&mut self, now: Instant) -> StoreResult<TickEvents> {
        let mut events = TickEvents::default();
        if self.content_save.fire_if_due(now) {
            events.content_saved = self.persist_content()?;
        }
        if self.saved_notice.fire_if_due(now) {
            self.saved_notice_visible = false;
            events.notice_hidden = true;
        }
        Ok(events)
    }

    /// Earliest pending deadline, for front ends that sleep between ticks.
    pub fn next_deadline_in(&self, now: Instant) -> Option<Duration> {
        match (
            self.content_save.remaining(now),
            self.saved_notice.remaining(now),
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Deletes the selected task, if any, and clears the editor.
    pub fn delete_selected_task(&mut self) -> StoreResult<Option<TaskId>> {
        let Some(task_id) = self.selected_task else {
            return Ok(None);
        };
        self.content_save.cancel();
        self.store.delete_task(task_id)?;
        self.selected_task = None;
        self.editor = EditorState::default();
        self.reload()?;
        Ok(Some(task_id))
    }

    /// Deletes a category with all of its tasks.
    ///
    /// The caller is expected to have confirmed with the user. The task
    /// selection is cleared when the cascade removed the selected task,
    /// including an orphan whose stale category id matched.
    pub fn delete_category(&mut self, category_id: CategoryId) -> StoreResult<()> {
        self.flush_pending_content()?;
        self.store.delete_category_and_tasks(category_id)?;

        if self.selected_category == Some(category_id) {
            self.selected_category = None;
        }
        if let Some(task_id) = self.selected_task {
            if !self.store.task_exists(task_id)? {
                self.selected_task = None;
                self.editor = EditorState::default();
            }
        }
        self.reload()
    }

    /// Writes any pending edit, flushes the store and shows the notice.
    pub fn save_all(&mut self, now: Instant) -> StoreResult<()> {
        self.flush_pending_content()?;
        self.store.flush()?;
        self.saved_this_session = true;
        self.saved_notice_visible = true;
        self.saved_notice.start(now);
        Ok(())
    }

    /// Writes any pending edit and hands the store back for closing.
    pub fn shutdown(mut self) -> StoreResult<S> {
        self.flush_pending_content()?;
        Ok(self.store)
    }

    fn flush_pending_content(&mut self) -> StoreResult<()> {
        if self.content_save.take_pending() {
            self.persist_content()?;
        }
        Ok(())
    }

    fn persist_content(&mut self) -> StoreResult<bool> {
        let Some(task_id) = self.selected_task else {
            return Ok(false);
        };
        let stamp = current_timestamp();
        self.store.update_task_content(task_id, &self.editor.content)?;
        self.store.update_task_last_modified(task_id, &stamp)?;
        self.editor.last_modified = Some(stamp);
        Ok(true)
    }

    fn find_task_name(&self, task_id: TaskId) -> StoreResult<Option<String>> {
        for category in self.store.list_categories()? {
            if let Some(task) = self
                .store
                .list_tasks(category.id)?
                .into_iter()
                .find(|task| task.id == task_id)
            {
                return Ok(Some(task.name));
            }
        }
        Ok(None)
    }
}
