//! The worker's dedicated thread.

use parley_error::{WorkerError, WorkerErrorKind};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const JOIN_POLL: Duration = Duration::from_millis(10);

/// Cooperative stop flag shared by the producer, the worker and the handle.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// A lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the worker to finish. Idempotent.
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether stop has been requested.
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Owns the OS thread running the chat worker.
///
/// The thread builds its own current-thread Tokio runtime, so the host need
/// not run one and engine callbacks never block on async code.
#[derive(Debug)]
pub struct WorkerHandle {
    name: String,
    stop: StopSignal,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Start `future` on a new thread called `name`.
    ///
    /// # Errors
    ///
    /// Fails if the OS refuses the thread. A runtime that cannot be built is
    /// logged from inside the thread and the worker exits immediately.
    pub fn spawn<F>(name: &str, stop: StopSignal, future: F) -> Result<Self, WorkerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let thread_name = name.to_string();
        let thread = std::thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let err = WorkerError::new(WorkerErrorKind::Runtime(e.to_string()));
                        error!(error = %err, "Worker cannot start");
                        return;
                    }
                };
                runtime.block_on(future);
                debug!(thread = %thread_name, "Worker thread exiting");
            })
            .map_err(|e| WorkerError::new(WorkerErrorKind::Spawn(e.to_string())))?;

        info!(thread = name, "Started worker thread");
        Ok(Self {
            name: name.to_string(),
            stop,
            thread: Some(thread),
        })
    }

    /// Thread name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Raise the stop signal and wait up to `join_window` for the thread.
    ///
    /// Returns `true` if the thread exited in time. Otherwise the thread is
    /// detached and left to finish on its own.
    pub fn stop(mut self, join_window: Duration) -> bool {
        self.stop.raise();
        let Some(thread) = self.thread.take() else {
            return true;
        };

        let deadline = Instant::now() + join_window;
        while !thread.is_finished() {
            if Instant::now() >= deadline {
                warn!(
                    thread = %self.name,
                    window_ms = join_window.as_millis() as u64,
                    "Worker did not stop in time; detaching"
                );
                return false;
            }
            std::thread::sleep(JOIN_POLL);
        }

        if thread.join().is_err() {
            error!(thread = %self.name, "Worker thread panicked");
        }
        info!(thread = %self.name, "Worker stopped");
        true
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.stop.raise();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_joins_a_cooperative_worker() {
        let stop = StopSignal::new();
        let flag = stop.clone();
        let handle = WorkerHandle::spawn("test-worker", stop, async move {
            while !flag.is_raised() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .unwrap();

        assert_eq!(handle.name(), "test-worker");
        assert!(handle.stop(Duration::from_secs(2)));
    }

    #[test]
    fn stop_detaches_a_stuck_worker() {
        let stop = StopSignal::new();
        let handle = WorkerHandle::spawn("stuck-worker", stop, async {
            tokio::time::sleep(Duration::from_secs(2)).await;
        })
        .unwrap();

        let started = Instant::now();
        assert!(!handle.stop(Duration::from_millis(50)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
