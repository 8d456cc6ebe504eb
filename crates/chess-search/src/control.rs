//! State shared between the control thread and a running search.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{after, bounded, select, Receiver, Sender};
use tracing::debug;

/// Stop and abort flags plus a progress gauge for one search request.
///
/// Stopping ends the search early and keeps what it has found. Aborting also
/// stops it and discards the result.
#[derive(Debug)]
pub struct SearchControl {
    stop: AtomicBool,
    aborted: AtomicBool,
    progress: AtomicU8,
    // Dropped on abort, which disconnects `abort_signal`.
    abort_guard: Mutex<Option<Sender<()>>>,
    abort_signal: Receiver<()>,
}

impl Default for SearchControl {
    fn default() -> Self {
        let (guard, signal) = bounded::<()>(0);
        SearchControl {
            stop: AtomicBool::new(false),
            aborted: AtomicBool::new(false),
            progress: AtomicU8::new(0),
            abort_guard: Mutex::new(Some(guard)),
            abort_signal: signal,
        }
    }
}

impl SearchControl {
    pub fn new() -> Arc<Self> {
        Arc::new(SearchControl::default())
    }

    /// Asks the search to wind down at the next node.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Stops the search and marks its result as unwanted.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
        self.stop.store(true, Ordering::Release);
        self.abort_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Waits for `delay`, returning early if the request is aborted.
    ///
    /// Returns `true` when the full delay elapsed without an abort.
    pub fn wait_unless_aborted(&self, delay: Duration) -> bool {
        if delay.is_zero() || self.is_aborted() {
            return !self.is_aborted();
        }
        select! {
            recv(after(delay)) -> _ => {}
            recv(self.abort_signal) -> _ => {}
        }
        !self.is_aborted()
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Percentage of root moves examined in the current iteration.
    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::Relaxed)
    }

    pub(crate) fn set_progress(&self, percent: u8) {
        self.progress.store(percent.min(100), Ordering::Relaxed);
    }
}

/// Requests a stop once a budget elapses, unless dropped first.
pub(crate) struct Timer {
    done: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Timer {
    pub(crate) fn arm(budget: Duration, control: Arc<SearchControl>) -> Self {
        let (done, disarmed) = bounded::<()>(0);
        let handle = thread::spawn(move || {
            select! {
                recv(after(budget)) -> _ => {
                    debug!(budget_ms = budget.as_millis() as u64, "search time expired");
                    control.request_stop();
                }
                recv(disarmed) -> _ => {}
            }
        });
        Timer {
            done: Some(done),
            handle: Some(handle),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        // Disconnecting the channel wakes the timer thread.
        self.done.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
