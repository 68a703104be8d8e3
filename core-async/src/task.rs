//! Task spawning.
//!
//! Repository cursors, metadata extraction and image codecs are blocking
//! operations. They must run through [`spawn_blocking`] so the async workers
//! stay free to deliver stream events.

pub use tokio::task::{spawn_blocking, yield_now, JoinError, JoinHandle};

/// Spawns an async task on the current Tokio runtime.
///
/// # Panics
///
/// Panics when called outside of a Tokio runtime context.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Returns `true` when the join error was caused by a panic in the task.
pub fn is_panic(error: &JoinError) -> bool {
    error.is_panic()
}

/// Extracts a printable message from a panicked task's join error.
pub fn panic_message(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}
