//! Cooperative cancellation for long-running searches.
//!
//! A handler is polled by the search loop at well-defined checkpoints: each
//! conflict of a SAT search, each bound improvement of a MaxSAT search. A
//! callback returning `false` tells the search to stop making progress and
//! report an unknown/aborted outcome; solver state is never corrupted,
//! because the search only gives up between checkpoints.
//!
//! Cancellation is advisory: the actual abort latency is the spacing between
//! checkpoints, not the configured timeout. All callbacks run on the thread
//! driving the search; every search run owns its handler exclusively.

use std::time::{Duration, Instant};

use crate::solver::Model;

/// Sentinel returned by the bound accessors before any bound was recorded.
pub const NO_BOUND: i32 = -1;

/// Cancellation contract for SAT search.
pub trait SatHandler {
    /// Called exactly once when the search begins.
    fn started_solving(&mut self) {}

    /// Called at every conflict; `false` aborts the search.
    fn detected_conflict(&mut self) -> bool {
        true
    }

    /// Called exactly once on normal or aborted termination.
    fn finished_solving(&mut self) {}
}

/// Cancellation contract for MaxSAT branch and bound.
pub trait MaxSatHandler {
    /// Called exactly once when the search begins.
    fn started_solving(&mut self) {}

    /// The handler used for the SAT-level conflict checkpoints, if any.
    fn sat_handler(&mut self) -> Option<&mut dyn SatHandler> {
        None
    }

    /// Called when the search proves a better lower bound; `false` aborts.
    fn found_lower_bound(&mut self, bound: i32, model: &Model) -> bool;

    /// Called when the search finds a better upper bound; `false` aborts.
    fn found_upper_bound(&mut self, bound: i32, model: &Model) -> bool;

    /// Called exactly once on normal or aborted termination.
    fn finished_solving(&mut self) {}

    /// Best lower bound seen so far, or [`NO_BOUND`].
    fn lower_bound_approximation(&self) -> i32;

    /// Best upper bound seen so far, or [`NO_BOUND`].
    fn upper_bound_approximation(&self) -> i32;
}

/// A SAT handler that never cancels.
#[derive(Debug, Default, Copy, Clone)]
pub struct NopSatHandler;

impl SatHandler for NopSatHandler {}

/// A MaxSAT handler that records bounds and never cancels.
#[derive(Debug, Default, Copy, Clone)]
pub struct NopMaxSatHandler {
    current_lb: Option<i32>,
    current_ub: Option<i32>,
}

impl NopMaxSatHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MaxSatHandler for NopMaxSatHandler {
    fn found_lower_bound(&mut self, bound: i32, _model: &Model) -> bool {
        self.current_lb = Some(bound);
        true
    }

    fn found_upper_bound(&mut self, bound: i32, _model: &Model) -> bool {
        self.current_ub = Some(bound);
        true
    }

    fn lower_bound_approximation(&self) -> i32 {
        self.current_lb.unwrap_or(NO_BOUND)
    }

    fn upper_bound_approximation(&self) -> i32 {
        self.current_ub.unwrap_or(NO_BOUND)
    }
}

/// A SAT handler that cancels the search after a wall-clock timeout.
///
/// The deadline is captured in [`SatHandler::started_solving`]; each
/// conflict checkpoint compares the monotonic clock against it. The search
/// may overrun the timeout by the time between two conflicts.
#[derive(Debug, Clone)]
pub struct TimeoutSatHandler {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl TimeoutSatHandler {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }
}

impl SatHandler for TimeoutSatHandler {
    fn started_solving(&mut self) {
        self.deadline = Some(Instant::now() + self.timeout);
    }

    fn detected_conflict(&mut self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() < deadline,
            // Never started: nothing to compare against, keep going.
            None => true,
        }
    }
}

/// A MaxSAT handler that cancels the search after a wall-clock timeout and
/// keeps track of the best bounds found so far.
///
/// The continue/abort decision depends only on elapsed time, never on the
/// quality of the reported bound. After an aborted search the accessors
/// still return the best bounds that were reached.
#[derive(Debug, Clone)]
pub struct TimeoutMaxSatHandler {
    timeout: Duration,
    sat: TimeoutSatHandler,
    deadline: Option<Instant>,
    current_lb: Option<i32>,
    current_ub: Option<i32>,
}

impl TimeoutMaxSatHandler {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            sat: TimeoutSatHandler::new(timeout),
            deadline: None,
            current_lb: None,
            current_ub: None,
        }
    }

    fn keep_going(&self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() < deadline,
            None => true,
        }
    }
}

impl MaxSatHandler for TimeoutMaxSatHandler {
    fn started_solving(&mut self) {
        self.sat.started_solving();
        self.deadline = Some(Instant::now() + self.timeout);
    }

    fn sat_handler(&mut self) -> Option<&mut dyn SatHandler> {
        Some(&mut self.sat)
    }

    fn found_lower_bound(&mut self, bound: i32, _model: &Model) -> bool {
        self.current_lb = Some(bound);
        self.keep_going()
    }

    fn found_upper_bound(&mut self, bound: i32, _model: &Model) -> bool {
        self.current_ub = Some(bound);
        self.keep_going()
    }

    fn lower_bound_approximation(&self) -> i32 {
        self.current_lb.unwrap_or(NO_BOUND)
    }

    fn upper_bound_approximation(&self) -> i32 {
        self.current_ub.unwrap_or(NO_BOUND)
    }
}
