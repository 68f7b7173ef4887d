//! Progress reporting and cooperative cancellation for long-running loops.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

/// Receives `(completed, total)` after every finished unit of work.
///
/// Observers may be called from several threads at once when the bootstrap
/// runs on a parallel engine, so `completed` is monotone but not necessarily
/// delivered in order.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, completed: usize, total: usize);
}

/// Observer that ignores all updates
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressObserver for NullProgress {
    fn on_progress(&self, _completed: usize, _total: usize) {}
}

/// Logs progress at `info` each time another 10% completes
#[derive(Debug, Default)]
pub struct TracingProgress {
    label: &'static str,
    last_decile: AtomicUsize,
}

impl TracingProgress {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            last_decile: AtomicUsize::new(0),
        }
    }
}

impl ProgressObserver for TracingProgress {
    fn on_progress(&self, completed: usize, total: usize) {
        if total == 0 {
            return;
        }
        let decile = completed * 10 / total;
        let previous = self.last_decile.fetch_max(decile, Ordering::Relaxed);
        if decile > previous {
            info!(
                label = self.label,
                completed,
                total,
                "{}% complete",
                decile * 10
            );
        }
    }
}

/// Adapter turning a closure into an observer
pub struct FnProgress<F>(pub F);

impl<F> FnProgress<F>
where
    F: Fn(usize, usize) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> ProgressObserver for FnProgress<F>
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_progress(&self, completed: usize, total: usize) {
        (self.0)(completed, total)
    }
}

impl<T: ProgressObserver + ?Sized> ProgressObserver for Arc<T> {
    fn on_progress(&self, completed: usize, total: usize) {
        (**self).on_progress(completed, total)
    }
}

/// Shared flag checked between bootstrap iterations
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
