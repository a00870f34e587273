//! Watch mode: file watching, debouncing, and the rebuild loop.
//!
//! The loop is a small state machine:
//!
//! - **Idle** - waiting for the first change
//! - **Debouncing** - changes seen, quiet window not yet elapsed; every new
//!   change pushes the deadline out
//! - **Building** - a pass is running; it is never interrupted, and changes
//!   arriving meanwhile queue a fresh debounce cycle
//! - **Failed** - the last pass failed; the error stays on screen and the
//!   next change starts a new cycle
//!
//! A failed pass never tears down the loop, and the atomic writer guarantees
//! the previous output survives it.

mod debounce;
mod watcher;

pub use debounce::Debouncer;
pub use watcher::{FileChange, FileWatcher, PollWatcher};

use crate::error::Result;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::debug;

/// Rebuild loop states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// No pending changes
    Idle,
    /// Changes pending, quiet window running
    Debouncing,
    /// A pass is in flight
    Building,
    /// The last pass failed; waiting for the next change
    Failed,
}

/// Pure state machine driving the rebuild loop.
///
/// Time is passed in, never read, so transitions are unit-testable with
/// synthetic instants.
#[derive(Debug)]
pub struct RebuildDriver {
    state: WatchState,
    debouncer: Debouncer,
    changed_while_building: bool,
}

impl RebuildDriver {
    /// Create a driver with the given debounce window.
    pub fn new(window: Duration) -> Self {
        Self {
            state: WatchState::Idle,
            debouncer: Debouncer::new(window),
            changed_while_building: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> WatchState {
        self.state
    }

    /// A change event arrived at `now`.
    pub fn on_change(&mut self, now: Instant) {
        match self.state {
            WatchState::Building => {
                self.changed_while_building = true;
            }
            WatchState::Idle | WatchState::Debouncing | WatchState::Failed => {
                self.debouncer.record(now);
                self.state = WatchState::Debouncing;
            }
        }
    }

    /// When the loop should next wake up, if a window is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            WatchState::Debouncing => self.debouncer.deadline(),
            _ => None,
        }
    }

    /// Clock tick at `now`. Returns true when a build should start; the
    /// driver is then in `Building` until [`RebuildDriver::on_build_finished`].
    pub fn on_tick(&mut self, now: Instant) -> bool {
        if self.state == WatchState::Debouncing && self.debouncer.fire(now) {
            self.state = WatchState::Building;
            return true;
        }
        false
    }

    /// The in-flight pass finished. Changes seen during the pass start a
    /// fresh debounce cycle regardless of the outcome.
    pub fn on_build_finished(&mut self, ok: bool, now: Instant) {
        if self.changed_while_building {
            self.changed_while_building = false;
            self.debouncer.record(now);
            self.state = WatchState::Debouncing;
        } else {
            self.state = if ok {
                WatchState::Idle
            } else {
                WatchState::Failed
            };
        }
    }
}

/// Drive the rebuild loop until the watcher channel closes or Ctrl-C.
///
/// `rebuild` runs one pass; its outcome feeds the state machine. Passes run
/// to completion on this task, so they are never interrupted by incoming
/// events - those buffer in the channel and start the next cycle.
pub async fn run_loop<F>(
    mut events: mpsc::Receiver<FileChange>,
    window: Duration,
    mut rebuild: F,
) -> Result<()>
where
    F: FnMut() -> bool,
{
    let mut driver = RebuildDriver::new(window);

    loop {
        let deadline = driver.next_deadline();
        let sleep = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            maybe_change = events.recv() => {
                match maybe_change {
                    Some(change) => {
                        debug!("change: {}", change.path().display());
                        driver.on_change(Instant::now());
                    }
                    None => return Ok(()),
                }
            }
            _ = sleep => {
                if driver.on_tick(Instant::now()) {
                    let ok = rebuild();
                    driver.on_build_finished(ok, Instant::now());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                return Ok(());
            }
        }
    }
}
