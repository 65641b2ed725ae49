//! Completion events for remote mutations.
//!
//! Request tasks never touch the list. They send one of these events and the
//! owner of the [`TodoList`](super::TodoList) applies it on its own task,
//! so the canonical list, pending set and notice need no locking.

use super::{TodoList, UNABLE_TO_ADD, UNABLE_TO_DELETE, UNABLE_TO_UPDATE};
use crate::api::{RemoteStore, StoreError};
use crate::model::{Todo, TodoId, TodoPatch};

/// Outcome of one remote mutation.
#[derive(Debug)]
pub(crate) enum StoreEvent {
    /// A create request for the current placeholder finished.
    Created { result: Result<Todo, StoreError> },
    /// An update request finished. `patch` is what was sent and is merged on success.
    Updated {
        id: TodoId,
        patch: TodoPatch,
        result: Result<(), StoreError>,
    },
    Deleted {
        id: TodoId,
        result: Result<(), StoreError>,
    },
}

impl<S: RemoteStore> TodoList<S> {
    pub(super) fn apply(&mut self, event: StoreEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match event {
            StoreEvent::Created { result } => self.handle_created(result),
            StoreEvent::Updated { id, patch, result } => self.handle_updated(id, &patch, result),
            StoreEvent::Deleted { id, result } => self.handle_deleted(id, result),
        }
    }

    fn handle_created(&mut self, result: Result<Todo, StoreError>) {
        // Placeholder goes away on both outcomes
        self.placeholder = None;

        match result {
            Ok(todo) => {
                tracing::debug!(todo_id = %todo.id, "Create confirmed");
                self.todos.push(todo);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Create failed, discarding placeholder");
                self.notice.raise(UNABLE_TO_ADD);
            }
        }
    }

    fn handle_updated(&mut self, id: TodoId, patch: &TodoPatch, result: Result<(), StoreError>) {
        self.pending.unmark(id);

        match result {
            Ok(()) => match self.todos.iter_mut().find(|t| t.id == id) {
                Some(todo) => {
                    todo.apply(patch);
                    tracing::debug!(todo_id = %id, "Update confirmed");
                }
                None => {
                    // Deleted by an overlapping request before this one resolved
                    tracing::debug!(todo_id = %id, "Update confirmed for a todo no longer in the list");
                }
            },
            Err(e) => {
                tracing::warn!(todo_id = %id, error = %e, "Update failed, keeping previous state");
                self.notice.raise(UNABLE_TO_UPDATE);
            }
        }
    }

    fn handle_deleted(&mut self, id: TodoId, result: Result<(), StoreError>) {
        self.pending.unmark(id);

        match result {
            Ok(()) => {
                self.todos.retain(|t| t.id != id);
                tracing::debug!(todo_id = %id, "Delete confirmed");
            }
            Err(e) => {
                tracing::warn!(todo_id = %id, error = %e, "Delete failed, keeping todo");
                self.notice.raise(UNABLE_TO_DELETE);
            }
        }
    }
}
