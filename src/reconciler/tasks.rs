//! Background request tasks.
//!
//! Every remote mutation runs on its own tokio task and reports back with
//! exactly one [`StoreEvent`], even if the request future panics, so the
//! reconciler can always unwind its pending marks.

use super::events::StoreEvent;
use crate::api::StoreError;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Catch panics from an async task and convert them to error messages.
///
/// Wraps a future with `catch_unwind` so a panicking request still produces
/// a completion event instead of silently dropping it.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Spawn `request` and send its outcome, wrapped by `into_event`, to `tx`.
pub(super) fn spawn_request<F, T, E>(
    task: &'static str,
    request: F,
    tx: mpsc::Sender<StoreEvent>,
    into_event: E,
) where
    F: Future<Output = Result<T, StoreError>> + Send + 'static,
    T: Send + 'static,
    E: FnOnce(Result<T, StoreError>) -> StoreEvent + Send + 'static,
{
    tokio::spawn(async move {
        let result = match catch_task_panic(request).await {
            Ok(result) => result,
            Err(panic_msg) => {
                tracing::error!(task, error = %panic_msg, "Store request panicked");
                Err(StoreError::TaskPanicked(panic_msg))
            }
        };

        if let Err(e) = tx.send(into_event(result)).await {
            tracing::warn!(task, error = %e, "Failed to send store event (receiver dropped)");
        }
    });
}
