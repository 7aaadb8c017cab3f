//! Progress reporting
//!
//! Long-running operators report `(tag, done, total)` to a
//! [`ProgressMonitor`]. Returning `false` asks the operator to stop; it
//! then fails with a cancellation error naming the tag.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Tag reported by the morphology executors
pub const MORPHOLOGY_TAG: &str = "Morphology/Image";

/// Receiver of progress reports
///
/// Implementations must be callable from several worker threads at once.
pub trait ProgressMonitor: Sync {
    /// Report that `done` of `total` units have finished
    ///
    /// Return `false` to cancel the operation.
    fn report(&self, tag: &str, done: u64, total: u64) -> bool;
}

impl<F> ProgressMonitor for F
where
    F: Fn(&str, u64, u64) -> bool + Sync,
{
    fn report(&self, tag: &str, done: u64, total: u64) -> bool {
        self(tag, done, total)
    }
}

/// Shared counter driving an optional monitor
///
/// Each call to [`Progress::tick`] advances the counter by one unit and
/// forwards the new count. Once the monitor has declined, every later tick
/// also returns `false`.
pub struct Progress<'a> {
    monitor: Option<&'a dyn ProgressMonitor>,
    tag: &'static str,
    total: u64,
    done: AtomicU64,
    cancelled: AtomicBool,
}

impl<'a> Progress<'a> {
    /// Create a counter over `total` units
    pub fn new(monitor: Option<&'a dyn ProgressMonitor>, tag: &'static str, total: u64) -> Self {
        Progress {
            monitor,
            tag,
            total,
            done: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Tag passed to the monitor
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Advance by one unit; `false` means stop
    pub fn tick(&self) -> bool {
        if self.cancelled.load(Ordering::Relaxed) {
            return false;
        }
        let Some(monitor) = self.monitor else {
            return true;
        };
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if monitor.report(self.tag, done, self.total) {
            true
        } else {
            self.cancelled.store(true, Ordering::Relaxed);
            false
        }
    }

    /// True once the monitor has declined
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
