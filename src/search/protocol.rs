//! Typed control protocol between a caller and a running search.
//!
//! A run moves `Idle -> Running -> {Complete | Error | Cancelled}` and streams
//! [`SearchEvent`]s over an `mpsc` channel while it runs. Exactly one terminal
//! event ends every run; after cancellation is observed nothing else is sent.

use super::{execute, Mode, SearchJob, SearchOutcome, SearchReport};
use crate::config::Config;
use crate::error::{RfResult, RuneError};
use crate::model::{CombinationSummary, Pools, ScoringContext};
use serde::Serialize;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RunState {
    Idle,
    Running,
    Complete,
    Error,
    Cancelled,
}

#[derive(Debug, Clone)]
pub enum SearchRequest {
    Start {
        pools: Pools,
        context: ScoringContext,
        config: Config,
    },
    /// Searches only the weapons at `weapons` positions of the bound-sorted
    /// weapon level, optionally seeded with a score found elsewhere.
    StartPartial {
        pools: Pools,
        context: ScoringContext,
        config: Config,
        weapons: Range<usize>,
        seed_score: Option<f64>,
    },
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SearchEvent {
    #[serde(rename_all = "camelCase")]
    Progress {
        processed: u64,
        skipped: u64,
        total: u64,
        best_score: Option<f64>,
        eta_seconds: Option<f64>,
    },
    BestFound {
        score: f64,
        summary: CombinationSummary,
    },
    PhaseStart {
        phase: u8,
    },
    #[serde(rename_all = "camelCase")]
    PhaseComplete {
        phase: u8,
        best_score: Option<f64>,
    },
    Complete(SearchReport),
    Error {
        message: String,
    },
    Cancelled,
}

impl SearchEvent {
    /// State a run is in once this event has been sent, for terminal events.
    pub fn terminal_state(&self) -> Option<RunState> {
        match self {
            Self::Complete(_) => Some(RunState::Complete),
            Self::Error { .. } => Some(RunState::Error),
            Self::Cancelled => Some(RunState::Cancelled),
            _ => None,
        }
    }
}

/// Synchronous receiver of search events.
pub trait SearchObserver {
    fn on_event(&mut self, event: SearchEvent);
}

impl<F: FnMut(SearchEvent)> SearchObserver for F {
    fn on_event(&mut self, event: SearchEvent) {
        self(event)
    }
}

/// Drops non-terminal events once cancellation has been requested.
pub struct Gate<'a> {
    observer: &'a mut dyn SearchObserver,
    cancel: &'a AtomicBool,
}

impl<'a> Gate<'a> {
    pub fn new(observer: &'a mut dyn SearchObserver, cancel: &'a AtomicBool) -> Self {
        Self { observer, cancel }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub fn emit(&mut self, event: SearchEvent) {
        if !self.is_cancelled() {
            self.observer.on_event(event);
        }
    }

    pub(crate) fn finish(&mut self, event: SearchEvent) {
        self.observer.on_event(event);
    }
}

fn read_state(state: &Mutex<RunState>) -> RunState {
    match state.lock() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn write_state(state: &Mutex<RunState>, next: RunState) {
    match state.lock() {
        Ok(mut guard) => *guard = next,
        Err(poisoned) => *poisoned.into_inner() = next,
    }
}

/// Caller side of one background run.
pub struct SearchHandle {
    events: Receiver<SearchEvent>,
    cancel: Arc<AtomicBool>,
    state: Arc<Mutex<RunState>>,
    worker: Option<JoinHandle<RfResult<SearchOutcome>>>,
}

impl SearchHandle {
    /// Starts `job` on a dedicated thread.
    pub fn spawn(job: SearchJob, mode: Mode) -> RfResult<Self> {
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let state = Arc::new(Mutex::new(RunState::Running));

        let worker = {
            let cancel = Arc::clone(&cancel);
            let state = Arc::clone(&state);
            thread::Builder::new()
                .name("runeforge-search".into())
                .spawn(move || {
                    let mut forward = |event: SearchEvent| {
                        if let Some(next) = event.terminal_state() {
                            write_state(&state, next);
                        }
                        // The caller may have dropped the handle; the run still
                        // finishes and its result is discarded.
                        let _ = tx.send(event);
                    };
                    execute(&job, &mode, &cancel, &mut forward)
                })?
        };

        Ok(Self {
            events: rx,
            cancel,
            state,
            worker: Some(worker),
        })
    }

    /// Requests cooperative cancellation. Idempotent.
    pub fn cancel(&self) {
        debug!("Cancellation requested");
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> RunState {
        read_state(&self.state)
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    /// Blocks for the next event. `None` once the run has ended and every
    /// event has been read.
    pub fn recv(&self) -> Option<SearchEvent> {
        self.events.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<SearchEvent> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn try_recv(&self) -> Option<SearchEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Blocking iterator over all remaining events.
    pub fn events(&self) -> impl Iterator<Item = SearchEvent> + '_ {
        self.events.iter()
    }

    /// Waits for the run to end. Unread events stay in the channel.
    pub fn wait(mut self) -> RfResult<SearchOutcome> {
        self.join()
    }

    fn join(&mut self) -> RfResult<SearchOutcome> {
        match self.worker.take() {
            Some(worker) => worker
                .join()
                .map_err(|_| RuneError::Internal("search thread panicked".into()))?,
            None => Err(RuneError::Internal("search already joined".into())),
        }
    }
}

/// Message-driven façade: one run at a time, requests posted as values.
#[derive(Default)]
pub struct SearchWorker {
    active: Option<SearchHandle>,
}

impl SearchWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        self.active
            .as_ref()
            .map(SearchHandle::state)
            .unwrap_or(RunState::Idle)
    }

    pub fn post(&mut self, request: SearchRequest) -> RfResult<()> {
        let (job, mode) = match request {
            SearchRequest::Cancel => {
                if let Some(handle) = &self.active {
                    handle.cancel();
                }
                return Ok(());
            }
            SearchRequest::Start {
                pools,
                context,
                config,
            } => (SearchJob::new(pools, context, config), Mode::Full),
            SearchRequest::StartPartial {
                pools,
                context,
                config,
                weapons,
                seed_score,
            } => (
                SearchJob::new(pools, context, config),
                Mode::Partial {
                    weapons,
                    seed_score,
                },
            ),
        };

        if self.state() == RunState::Running {
            return Err(RuneError::Busy);
        }
        self.active = Some(SearchHandle::spawn(job, mode)?);
        Ok(())
    }

    /// Handle of the current or last run.
    pub fn handle(&self) -> Option<&SearchHandle> {
        self.active.as_ref()
    }

    pub fn next_event(&self) -> Option<SearchEvent> {
        self.active.as_ref().and_then(SearchHandle::recv)
    }

    /// Detaches the current run from the worker.
    pub fn take(&mut self) -> Option<SearchHandle> {
        self.active.take()
    }
}
