//! Runs one engine request on a background thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, TryRecvError};
use tracing::debug;

use crate::control::SearchControl;
use crate::engine::{Engine, SearchEvent, SearchOutcome, SearchRequest};

/// What the caller will do with the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Play the move for the side to move.
    Move,
    /// Only suggest it.
    Hint,
}

/// A background search in flight.
///
/// The engine travels to the worker thread and back, so its carried state
/// survives across requests. Take it back with [`Thinker::join`] once
/// [`SearchEvent::Finished`] has arrived.
pub struct Thinker {
    kind: RequestKind,
    control: Arc<SearchControl>,
    events: Receiver<SearchEvent>,
    handle: JoinHandle<Engine>,
}

impl Thinker {
    pub fn spawn(mut engine: Engine, request: SearchRequest, kind: RequestKind) -> Self {
        let control = SearchControl::new();
        let (tx, events) = unbounded();
        let worker_control = Arc::clone(&control);

        let handle = thread::spawn(move || {
            let delay = if kind == RequestKind::Move && request.history.is_empty() {
                engine.config().first_move_delay()
            } else {
                Duration::ZERO
            };
            let outcome = if worker_control.wait_unless_aborted(delay) {
                engine.think(&request, &worker_control, &tx)
            } else {
                SearchOutcome::Cancelled
            };
            debug!(?kind, ?outcome, "request finished");
            let _ = tx.send(SearchEvent::Finished(outcome));
            engine
        });

        Thinker {
            kind,
            control,
            events,
            handle,
        }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn control(&self) -> &Arc<SearchControl> {
        &self.control
    }

    /// The next pending event without blocking. `Err` means the worker is
    /// gone without finishing.
    pub fn try_event(&self) -> Result<Option<SearchEvent>, Disconnected> {
        match self.events.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(Disconnected),
        }
    }

    /// Blocks for the next event.
    pub fn next_event(&self) -> Result<SearchEvent, Disconnected> {
        self.events.recv().map_err(|_| Disconnected)
    }

    /// Waits for the worker and hands back its engine. `None` if the worker
    /// panicked.
    pub fn join(self) -> Option<Engine> {
        self.handle.join().ok()
    }
}

/// The worker thread ended without reporting a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disconnected;
