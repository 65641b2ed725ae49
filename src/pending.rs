use crate::model::TodoId;
use std::collections::HashSet;

/// Ids with a remote mutation in flight.
///
/// Drives the per-row busy indicator. Marking an id that is already pending
/// is allowed: the reconciler does not block a second toggle, rename or delete
/// on a busy row, and the first completion to arrive clears the mark.
#[derive(Debug, Clone, Default)]
pub struct PendingSet {
    ids: HashSet<TodoId>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, id: TodoId) {
        if !self.ids.insert(id) {
            tracing::debug!(todo_id = %id, "Todo already pending, issuing another request anyway");
        }
    }

    pub fn unmark(&mut self, id: TodoId) {
        self.ids.remove(&id);
    }

    pub fn is_pending(&self, id: TodoId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_unmark() {
        let mut pending = PendingSet::new();
        assert!(pending.is_empty());

        pending.mark(TodoId(1));
        pending.mark(TodoId(2));
        assert!(pending.is_pending(TodoId(1)));
        assert!(pending.is_pending(TodoId(2)));
        assert!(!pending.is_pending(TodoId(3)));
        assert_eq!(pending.len(), 2);

        pending.unmark(TodoId(1));
        assert!(!pending.is_pending(TodoId(1)));
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_double_mark_single_unmark_clears() {
        let mut pending = PendingSet::new();
        pending.mark(TodoId(4));
        pending.mark(TodoId(4));
        assert_eq!(pending.len(), 1);

        pending.unmark(TodoId(4));
        assert!(!pending.is_pending(TodoId(4)));
    }

    #[test]
    fn test_unmark_unknown_is_noop() {
        let mut pending = PendingSet::new();
        pending.unmark(TodoId(99));
        assert!(pending.is_empty());
    }
}
