//! Derived views over the canonical list. Everything here is pure.

use crate::model::Todo;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Which todos the list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !todo.completed,
            Filter::Completed => todo.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" => Ok(Filter::Completed),
            other => Err(format!(
                "unknown filter '{other}' (expected all, active or completed)"
            )),
        }
    }
}

/// Todos matching `filter`, in list order.
pub fn visible(todos: &[Todo], filter: Filter) -> Vec<&Todo> {
    todos.iter().filter(|t| filter.matches(t)).collect()
}

/// True when every todo is completed, so "toggle all" would un-complete them.
/// Vacuously true for an empty list.
pub fn is_toggle_all_active(todos: &[Todo]) -> bool {
    todos.iter().all(|t| t.completed)
}

/// Whether a "clear completed" control has anything to do.
pub fn has_completed(todos: &[Todo]) -> bool {
    todos.iter().any(|t| t.completed)
}

pub fn active_count(todos: &[Todo]) -> usize {
    todos.iter().filter(|t| !t.completed).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TodoId, UserId};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn todo(id: i64, completed: bool) -> Todo {
        Todo {
            id: TodoId(id),
            user_id: UserId(1),
            title: format!("todo {id}"),
            completed,
        }
    }

    fn ids(todos: &[&Todo]) -> Vec<i64> {
        todos.iter().map(|t| t.id.0).collect()
    }

    #[test]
    fn test_visible_by_mode() {
        let list = vec![todo(1, false), todo(2, true), todo(3, false)];
        assert_eq!(ids(&visible(&list, Filter::All)), vec![1, 2, 3]);
        assert_eq!(ids(&visible(&list, Filter::Active)), vec![1, 3]);
        assert_eq!(ids(&visible(&list, Filter::Completed)), vec![2]);
    }

    #[test]
    fn test_toggle_all_active_and_has_completed() {
        assert!(is_toggle_all_active(&[]));
        assert!(!has_completed(&[]));

        let mixed = vec![todo(1, true), todo(2, false)];
        assert!(!is_toggle_all_active(&mixed));
        assert!(has_completed(&mixed));
        assert_eq!(active_count(&mixed), 1);

        let done = vec![todo(1, true), todo(2, true)];
        assert!(is_toggle_all_active(&done));
        assert_eq!(active_count(&done), 0);
    }

    #[test]
    fn test_filter_parse_and_display() {
        assert_eq!("Active".parse::<Filter>(), Ok(Filter::Active));
        assert_eq!(" completed ".parse::<Filter>(), Ok(Filter::Completed));
        assert_eq!("all".parse::<Filter>(), Ok(Filter::All));
        assert!("done".parse::<Filter>().is_err());
        assert_eq!(Filter::Completed.to_string(), "completed");
    }

    proptest! {
        #[test]
        fn prop_active_and_completed_partition_all(
            items in proptest::collection::vec((any::<i64>(), any::<bool>()), 0..40)
        ) {
            let list: Vec<Todo> = items.iter().map(|&(id, c)| todo(id, c)).collect();

            let active = visible(&list, Filter::Active);
            let completed = visible(&list, Filter::Completed);
            let all = visible(&list, Filter::All);

            prop_assert_eq!(active.len() + completed.len(), all.len());
            prop_assert!(active.iter().all(|&a| !completed.iter().any(|&c| std::ptr::eq(a, c))));

            // Each side keeps list order, and interleaving by list position
            // reproduces the full list
            let position = |t: &Todo| list.iter().position(|l| std::ptr::eq(l, t)).unwrap();
            let mut merged: Vec<usize> = active
                .iter()
                .chain(completed.iter())
                .map(|&t| position(t))
                .collect();
            prop_assert!(active.windows(2).all(|w| position(w[0]) < position(w[1])));
            prop_assert!(completed.windows(2).all(|w| position(w[0]) < position(w[1])));
            merged.sort_unstable();
            prop_assert_eq!(merged, (0..list.len()).collect::<Vec<_>>());
            prop_assert_eq!(ids(&all), list.iter().map(|t| t.id.0).collect::<Vec<_>>());
        }
    }
}
