//! Dispatch middleware.
//!
//! Every action passes through the configured middleware, outermost first,
//! before it reaches the reducer. A middleware can observe an action, pass
//! it on with `next`, or swallow it by returning without calling `next`.

use super::error::StateError;
use super::root::Action;
use log::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Continuation handed to a middleware: runs the rest of the chain.
pub type Next<'a> = &'a mut dyn FnMut(Action) -> Result<(), StateError>;

pub trait Middleware: Send + Sync {
    fn handle(&self, action: Action, next: Next<'_>) -> Result<(), StateError>;
}

/// Timing summary for one action type.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionTiming {
    pub count: u64,
    pub total: Duration,
    pub max: Duration,
}

/// Times the reducer pass of every action and warns about slow ones.
///
/// Clones share their statistics, so the application can keep one handle
/// while the store owns another.
#[derive(Clone)]
pub struct PerformanceMiddleware {
    threshold: Duration,
    timings: Arc<Mutex<HashMap<&'static str, ActionTiming>>>,
}

impl PerformanceMiddleware {
    pub fn new(threshold: Duration) -> Self {
        PerformanceMiddleware {
            threshold,
            timings: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns a snapshot of the timings recorded so far.
    ///
    pub fn timings(&self) -> HashMap<&'static str, ActionTiming> {
        self.timings
            .lock()
            .map(|timings| timings.clone())
            .unwrap_or_default()
    }

    fn record(&self, name: &'static str, elapsed: Duration) {
        if let Ok(mut timings) = self.timings.lock() {
            let timing = timings.entry(name).or_default();
            timing.count += 1;
            timing.total += elapsed;
            timing.max = timing.max.max(elapsed);
        }
    }
}

impl Middleware for PerformanceMiddleware {
    fn handle(&self, action: Action, next: Next<'_>) -> Result<(), StateError> {
        let name = action.name();
        let start = Instant::now();
        let result = next(action);
        let elapsed = start.elapsed();

        self.record(name, elapsed);
        if elapsed > self.threshold {
            warn!(
                "Action '{}' took {:?} (threshold {:?})",
                name, elapsed, self.threshold
            );
        } else {
            debug!("Action '{}' took {:?}", name, elapsed);
        }
        result
    }
}
