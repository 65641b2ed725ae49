//! Client-side reconciliation of the todo list with the remote store.
//!
//! [`TodoList`] owns the canonical list for one user. Each mutating operation
//! validates against local state, records its optimistic bookkeeping (the add
//! placeholder or a pending mark), and spawns the matching remote request.
//! The list itself only changes when the request's completion event is applied,
//! so a failed request never has anything to roll back except bookkeeping.
//!
//! Requests for different todos run concurrently and complete in whatever
//! order the server answers; batch operations (`toggle_all`,
//! `clear_completed`) are just several independent requests.
//!
//! # Example
//!
//! ```ignore
//! let mut list = TodoList::new(store, UserId(42), Notice::default());
//! list.load().await?;
//! list.add("buy milk")?;
//! list.settle().await;
//! ```

mod events;
mod tasks;

use events::StoreEvent;

use crate::api::{RemoteStore, StoreError};
use crate::filter::{self, Filter};
use crate::model::{Placeholder, Row, Todo, TodoDraft, TodoId, TodoPatch, UserId};
use crate::notice::Notice;
use crate::pending::PendingSet;
use thiserror::Error;
use tokio::sync::mpsc;

pub const EMPTY_TITLE: &str = "Title can't be empty";
pub const UNABLE_TO_ADD: &str = "Unable to add a todo";
pub const UNABLE_TO_UPDATE: &str = "Unable to update a todo";
pub const UNABLE_TO_DELETE: &str = "Unable to delete a todo";

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The title was empty after trimming.
    #[error("Title can't be empty")]
    Validation,
    /// The operation named a todo that is not in the list.
    #[error("Todo {0} not found")]
    NotFound(TodoId),
    /// An add is already waiting for the server.
    #[error("Another todo is already being added")]
    AddInFlight,
    /// Loading the list from the remote store failed.
    #[error("Failed to fetch todos: {0}")]
    Fetch(#[from] StoreError),
}

/// What [`TodoList::rename`] decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The trimmed title equals the current one; nothing was sent.
    Unchanged,
    /// The new title was blank, so a delete was issued instead.
    Deleting,
    Renaming,
}

/// Counts a footer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSummary {
    pub total: usize,
    pub visible: usize,
    pub active: usize,
    pub has_completed: bool,
    pub toggle_all_active: bool,
}

/// The canonical todo list for one user and everything needed to keep it in
/// step with the remote store.
///
/// Mutating operations spawn tokio tasks and must be called from within a
/// runtime. Their results are applied by [`next_event`](Self::next_event),
/// [`settle`](Self::settle) or [`drain_ready`](Self::drain_ready).
pub struct TodoList<S: RemoteStore> {
    store: S,
    user_id: UserId,
    todos: Vec<Todo>,
    placeholder: Option<Placeholder>,
    pending: PendingSet,
    notice: Notice,
    filter: Filter,
    /// Requests spawned whose events have not been applied yet.
    in_flight: usize,
    event_tx: mpsc::Sender<StoreEvent>,
    event_rx: mpsc::Receiver<StoreEvent>,
}

impl<S: RemoteStore> TodoList<S> {
    pub fn new(store: S, user_id: UserId, notice: Notice) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            user_id,
            todos: Vec::new(),
            placeholder: None,
            pending: PendingSet::new(),
            notice,
            filter: Filter::All,
            in_flight: 0,
            event_tx,
            event_rx,
        }
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Replace the list with the user's todos from the remote store.
    ///
    /// On failure the list is left empty and a notice is raised. No retry.
    pub async fn load(&mut self) -> Result<usize, ReconcileError> {
        match self.store.list(self.user_id).await {
            Ok(todos) => {
                tracing::info!(user_id = %self.user_id, count = todos.len(), "Loaded todos");
                self.todos = todos;
                Ok(self.todos.len())
            }
            Err(e) => {
                tracing::warn!(user_id = %self.user_id, error = %e, "Failed to load todos");
                self.todos.clear();
                self.notice.raise(UNABLE_TO_UPDATE);
                Err(ReconcileError::Fetch(e))
            }
        }
    }

    /// Create a todo titled `title.trim()`.
    ///
    /// A placeholder is shown until the server answers. Only one add may be
    /// in flight at a time.
    pub fn add(&mut self, title: &str) -> Result<(), ReconcileError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            self.notice.raise(EMPTY_TITLE);
            return Err(ReconcileError::Validation);
        }
        if self.placeholder.is_some() {
            tracing::debug!("Add requested while another add is in flight");
            return Err(ReconcileError::AddInFlight);
        }

        self.placeholder = Some(Placeholder {
            title: trimmed.to_string(),
        });

        let draft = TodoDraft {
            title: trimmed.to_string(),
            completed: false,
            user_id: self.user_id,
        };
        tracing::debug!(title = %draft.title, "Issuing create");

        let store = self.store.clone();
        self.in_flight += 1;
        tasks::spawn_request(
            "create",
            async move { store.create(draft).await },
            self.event_tx.clone(),
            |result| StoreEvent::Created { result },
        );
        Ok(())
    }

    /// Flip `completed` on the todo with `id` once the server confirms.
    pub fn toggle(&mut self, id: TodoId) -> Result<(), ReconcileError> {
        let Some(completed) = self.find(id).map(|t| t.completed) else {
            self.notice.raise(UNABLE_TO_UPDATE);
            return Err(ReconcileError::NotFound(id));
        };
        self.issue_update(id, TodoPatch::completed(!completed));
        Ok(())
    }

    /// Retitle a todo.
    ///
    /// Comparison uses trimmed titles; a title that trims to the current one
    /// is ignored and a blank one deletes the todo. The title is sent exactly
    /// as given.
    pub fn rename(&mut self, id: TodoId, new_title: &str) -> Result<RenameOutcome, ReconcileError> {
        let Some(current) = self.find(id) else {
            self.notice.raise(UNABLE_TO_UPDATE);
            return Err(ReconcileError::NotFound(id));
        };

        let trimmed = new_title.trim();
        if trimmed == current.title.trim() {
            return Ok(RenameOutcome::Unchanged);
        }
        if trimmed.is_empty() {
            self.delete(id);
            return Ok(RenameOutcome::Deleting);
        }

        self.issue_update(id, TodoPatch::title(new_title));
        Ok(RenameOutcome::Renaming)
    }

    /// Delete the todo with `id`. The server decides whether it exists.
    pub fn delete(&mut self, id: TodoId) {
        self.pending.mark(id);
        tracing::debug!(todo_id = %id, "Issuing delete");

        let store = self.store.clone();
        self.in_flight += 1;
        tasks::spawn_request(
            "delete",
            async move { store.delete(id).await },
            self.event_tx.clone(),
            move |result| StoreEvent::Deleted { id, result },
        );
    }

    /// If everything is completed, toggle everything; otherwise complete the
    /// incomplete todos. Returns the number of requests issued.
    pub fn toggle_all(&mut self) -> usize {
        let all_completed = filter::is_toggle_all_active(&self.todos);
        let targets: Vec<(TodoId, bool)> = self
            .todos
            .iter()
            .filter(|t| all_completed || !t.completed)
            .map(|t| (t.id, t.completed))
            .collect();

        for &(id, completed) in &targets {
            self.issue_update(id, TodoPatch::completed(!completed));
        }
        tracing::debug!(count = targets.len(), all_completed, "Toggle all issued");
        targets.len()
    }

    /// Delete every completed todo. Returns the number of requests issued.
    pub fn clear_completed(&mut self) -> usize {
        let targets: Vec<TodoId> = self
            .todos
            .iter()
            .filter(|t| t.completed)
            .map(|t| t.id)
            .collect();

        for &id in &targets {
            self.delete(id);
        }
        targets.len()
    }

    fn issue_update(&mut self, id: TodoId, patch: TodoPatch) {
        self.pending.mark(id);
        tracing::debug!(todo_id = %id, ?patch, "Issuing update");

        let store = self.store.clone();
        let sent = patch.clone();
        self.in_flight += 1;
        tasks::spawn_request(
            "update",
            async move { store.update(id, sent).await },
            self.event_tx.clone(),
            move |result| StoreEvent::Updated { id, patch, result },
        );
    }

    // ------------------------------------------------------------------------
    // Applying completions
    // ------------------------------------------------------------------------

    /// Wait for the next request to finish and apply it.
    ///
    /// Returns false immediately when nothing is in flight. Cancel-safe, so it
    /// can sit in a `tokio::select!` loop.
    pub async fn next_event(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.event_rx.recv().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    /// Apply completions until no request is in flight.
    pub async fn settle(&mut self) {
        while self.next_event().await {}
    }

    /// Apply every completion that has already arrived, without waiting.
    /// Returns how many were applied.
    pub fn drain_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    // ------------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------------

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn placeholder(&self) -> Option<&Placeholder> {
        self.placeholder.as_ref()
    }

    /// True while an add waits for the server. Input should be disabled.
    pub fn is_adding(&self) -> bool {
        self.placeholder.is_some()
    }

    pub fn is_pending(&self, id: TodoId) -> bool {
        self.pending.is_pending(id)
    }

    /// True while any request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn notice(&self) -> &Notice {
        &self.notice
    }

    pub fn notice_mut(&mut self) -> &mut Notice {
        &mut self.notice
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn visible(&self) -> Vec<&Todo> {
        filter::visible(&self.todos, self.filter)
    }

    /// Visible todos followed by the placeholder of an in-flight add.
    pub fn rows(&self) -> Vec<Row<'_>> {
        let mut rows: Vec<Row<'_>> = self
            .visible()
            .into_iter()
            .map(|t| Row {
                id: Some(t.id),
                title: &t.title,
                completed: t.completed,
                busy: self.pending.is_pending(t.id),
            })
            .collect();

        if let Some(placeholder) = &self.placeholder {
            rows.push(Row {
                id: None,
                title: &placeholder.title,
                completed: false,
                busy: true,
            });
        }
        rows
    }

    pub fn summary(&self) -> ListSummary {
        ListSummary {
            total: self.todos.len(),
            visible: self.visible().len(),
            active: filter::active_count(&self.todos),
            has_completed: filter::has_completed(&self.todos),
            toggle_all_active: filter::is_toggle_all_active(&self.todos),
        }
    }

    fn find(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }
}
