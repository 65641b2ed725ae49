//! Remote store access.
//!
//! The remote todo API is the source of truth for identifiers and final
//! state. This module defines the [`RemoteStore`] seam the reconciler talks
//! to and [`HttpStore`], the implementation that speaks JSON over HTTP.
//!
//! # Example
//!
//! ```ignore
//! use todo_client::api::{HttpStore, RemoteStore};
//!
//! let store = HttpStore::new("https://mate.academy/students-api", Duration::from_secs(30), None)?;
//! let todos = store.list(UserId(42)).await?;
//! ```

mod http;

pub use http::HttpStore;

use crate::model::{Todo, TodoDraft, TodoId, TodoPatch, UserId};
use std::future::Future;
use thiserror::Error;

/// Errors from a single remote store call.
///
/// The reconciler does not distinguish between them when informing the user;
/// the variants exist for logging.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the size limit
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// Response body was not the expected JSON
    #[error("Invalid response body: {0}")]
    Decode(#[source] serde_json::Error),
    /// Request body could not be serialized
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
    /// The task running the request panicked before producing a result.
    #[error("Request task panicked: {0}")]
    TaskPanicked(String),
}

/// CRUD operations over a user's todos.
///
/// Implementations are cloned into each spawned request task, so cloning
/// should be cheap (share the underlying client).
pub trait RemoteStore: Clone + Send + Sync + 'static {
    /// Fetch every todo owned by `user_id`.
    fn list(&self, user_id: UserId) -> impl Future<Output = Result<Vec<Todo>, StoreError>> + Send;

    /// Persist a new todo. The returned record carries the server-assigned id.
    fn create(&self, draft: TodoDraft) -> impl Future<Output = Result<Todo, StoreError>> + Send;

    /// Apply a partial update. No body is returned; the caller merges the patch.
    fn update(
        &self,
        id: TodoId,
        patch: TodoPatch,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete(&self, id: TodoId) -> impl Future<Output = Result<(), StoreError>> + Send;
}
