use super::{RemoteStore, StoreError};
use crate::model::{Todo, TodoDraft, TodoId, TodoPatch, UserId};
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const MAX_RESPONSE_SIZE: usize = 1024 * 1024; // 1MB

/// [`RemoteStore`] backed by the todo REST API.
///
/// Cloning is cheap: the `reqwest::Client` pools connections internally and
/// the base URL and token are shared.
#[derive(Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base: Arc<Url>,
    timeout: Duration,
    token: Option<Arc<SecretString>>,
}

impl std::fmt::Debug for HttpStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStore")
            .field("base", &self.base.as_str())
            .field("timeout", &self.timeout)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpStore {
    /// Build a store rooted at `base_url` (e.g. `https://mate.academy/students-api`).
    ///
    /// HTTPS is required so the bearer token never travels in the clear;
    /// plain HTTP is accepted only for `localhost`/`127.0.0.1`.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        token: Option<SecretString>,
    ) -> Result<Self, StoreError> {
        let mut base =
            Url::parse(base_url).map_err(|e| StoreError::InvalidBaseUrl(e.to_string()))?;

        match base.scheme() {
            "https" => {}
            "http" if matches!(base.host_str(), Some("localhost" | "127.0.0.1")) => {
                tracing::warn!(base_url = %base, "Using non-HTTPS API base URL (localhost only)");
            }
            "http" => {
                tracing::error!(base_url = %base, "Rejecting non-HTTPS base URL (HTTPS required except for localhost)");
                return Err(StoreError::InsecureBaseUrl);
            }
            other => {
                return Err(StoreError::InvalidBaseUrl(format!(
                    "unsupported scheme '{other}'"
                )));
            }
        }
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidBaseUrl(base_url.to_string()));
        }
        base.set_query(None);
        base.set_fragment(None);

        let client = reqwest::Client::builder()
            .redirect(Policy::limited(3))
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base: Arc::new(base),
            timeout,
            token: token.map(Arc::new),
        })
    }

    /// Base URL with `segments` appended as path components.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = (*self.base).clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let request = match &self.token {
            Some(token) => request.header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            ),
            None => request,
        };

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| StoreError::Timeout)?
            .map_err(StoreError::Network)?;

        if !response.status().is_success() {
            return Err(StoreError::HttpStatus(response.status().as_u16()));
        }
        Ok(response)
    }

    fn with_json<B: Serialize>(
        request: reqwest::RequestBuilder,
        body: &B,
    ) -> Result<reqwest::RequestBuilder, StoreError> {
        let bytes = serde_json::to_vec(body).map_err(StoreError::Encode)?;
        Ok(request.header(CONTENT_TYPE, "application/json").body(bytes))
    }

    async fn read_json<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T, StoreError> {
        let bytes = tokio::time::timeout(self.timeout, read_limited_body(response, MAX_RESPONSE_SIZE))
            .await
            .map_err(|_| StoreError::Timeout)??;
        serde_json::from_slice(&bytes).map_err(StoreError::Decode)
    }
}

impl RemoteStore for HttpStore {
    async fn list(&self, user_id: UserId) -> Result<Vec<Todo>, StoreError> {
        let mut url = self.endpoint(&["todos"])?;
        url.query_pairs_mut()
            .append_pair("userId", &user_id.to_string());

        tracing::debug!(url = %url, "Fetching todos");
        let response = self.send(self.client.get(url)).await?;
        let todos: Vec<Todo> = self.read_json(response).await?;
        tracing::debug!(user_id = %user_id, count = todos.len(), "Fetched todos");
        Ok(todos)
    }

    async fn create(&self, draft: TodoDraft) -> Result<Todo, StoreError> {
        let url = self.endpoint(&["todos"])?;
        let request = Self::with_json(self.client.post(url), &draft)?;
        let response = self.send(request).await?;
        let todo: Todo = self.read_json(response).await?;
        tracing::debug!(todo_id = %todo.id, "Created todo");
        Ok(todo)
    }

    async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<(), StoreError> {
        let url = self.endpoint(&["todos", &id.to_string()])?;
        let request = Self::with_json(self.client.patch(url), &patch)?;
        // The response body (if any) is not used; the caller merges the patch.
        self.send(request).await?;
        Ok(())
    }

    async fn delete(&self, id: TodoId) -> Result<(), StoreError> {
        let url = self.endpoint(&["todos", &id.to_string()])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

async fn read_limited_body(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, StoreError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(StoreError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(StoreError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(StoreError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
