//! Task-list client that keeps a local todo list reconciled with a remote
//! HTTP API.
//!
//! - [`api`] - the remote store seam and its HTTP implementation
//! - [`reconciler`] - the canonical list and its request/completion cycle
//! - [`pending`] - ids with an outstanding mutation
//! - [`filter`] - All/Active/Completed views
//! - [`notice`] - single self-expiring error message
//! - [`config`] - optional TOML configuration

pub mod api;
pub mod config;
pub mod filter;
pub mod model;
pub mod notice;
pub mod pending;
pub mod reconciler;

pub use api::{HttpStore, RemoteStore, StoreError};
pub use filter::Filter;
pub use model::{Placeholder, Row, Todo, TodoDraft, TodoId, TodoPatch, User, UserId};
pub use notice::Notice;
pub use reconciler::{ListSummary, ReconcileError, RenameOutcome, TodoList};
