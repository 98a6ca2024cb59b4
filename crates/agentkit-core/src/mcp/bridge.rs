//! Blocking entry point for async work
//!
//! [`block_on_isolated`] runs a future on a private current-thread runtime
//! and returns its output to a synchronous caller. When the calling thread
//! is already inside a tokio runtime, nesting a runtime there would panic,
//! so the private runtime is moved to a dedicated worker thread and the
//! caller blocks on the join instead. The private runtime is dropped before
//! returning on every path.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Failed to build private runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Discovery worker panicked: {0}")]
    WorkerPanicked(String),
}

/// How [`block_on_isolated`] will run on the current thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeStrategy {
    /// No runtime drives this thread; run inline
    Inline,
    /// A runtime is active; isolate on a worker thread
    WorkerThread,
}

impl BridgeStrategy {
    pub fn detect() -> Self {
        match tokio::runtime::Handle::try_current() {
            Ok(_) => BridgeStrategy::WorkerThread,
            Err(_) => BridgeStrategy::Inline,
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn run_private<F, Fut, T>(make_future: F) -> Result<T, BridgeError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(BridgeError::Runtime)?;

    let outcome = runtime.block_on(AssertUnwindSafe(async move { make_future().await }).catch_unwind());
    // Blocking-pool tasks left behind by a timed-out future are detached.
    runtime.shutdown_background();

    outcome.map_err(|payload| BridgeError::WorkerPanicked(panic_message(payload)))
}

/// Run `make_future` to completion from synchronous code
///
/// The future is built and polled on a private runtime, so it must not
/// rely on the caller's runtime (spawned tasks, handles) outliving the call.
pub fn block_on_isolated<F, Fut, T>(make_future: F) -> Result<T, BridgeError>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = T>,
    T: Send + 'static,
{
    match BridgeStrategy::detect() {
        BridgeStrategy::Inline => run_private(make_future),
        BridgeStrategy::WorkerThread => {
            let worker = std::thread::Builder::new()
                .name("agentkit-mcp-discovery".to_string())
                .spawn(move || run_private(make_future))
                .map_err(BridgeError::Spawn)?;

            worker
                .join()
                .map_err(|payload| BridgeError::WorkerPanicked(panic_message(payload)))?
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn answer() -> u32 {
        tokio::time::sleep(Duration::from_millis(5)).await;
        42
    }

    #[test]
    fn test_inline_without_runtime() {
        assert_eq!(BridgeStrategy::detect(), BridgeStrategy::Inline);
        assert_eq!(block_on_isolated(answer).unwrap(), 42);
    }

    #[tokio::test]
    async fn test_worker_thread_inside_current_thread_runtime() {
        assert_eq!(BridgeStrategy::detect(), BridgeStrategy::WorkerThread);
        assert_eq!(block_on_isolated(answer).unwrap(), 42);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_worker_thread_inside_multi_thread_runtime() {
        let thread_name = block_on_isolated(|| async {
            std::thread::current().name().map(str::to_string)
        })
        .unwrap();
        assert_eq!(thread_name.as_deref(), Some("agentkit-mcp-discovery"));
    }

    #[test]
    fn test_panic_is_reported_inline() {
        let err = block_on_isolated(|| async {
            if true {
                panic!("boom");
            }
        })
        .unwrap_err();
        assert!(matches!(err, BridgeError::WorkerPanicked(ref m) if m == "boom"));
    }

    #[tokio::test]
    async fn test_panic_is_reported_from_worker() {
        let err = block_on_isolated(|| async {
            if true {
                panic!("{}", String::from("worker boom"));
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("worker boom"));
    }
}
