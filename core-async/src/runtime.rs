//! Runtime handles.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Run a future to completion on a throwaway current-thread runtime.
///
/// Used when a synchronous caller (a tracing layer, a host callback) has no
/// ambient runtime to spawn on.
pub fn block_on<F>(future: F) -> std::io::Result<F::Output>
where
    F: std::future::Future,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}
