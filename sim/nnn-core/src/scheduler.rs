//! Timed work.
//!
//! The protocol core never sleeps or spawns on its own. Whatever has to happen
//! later goes through a [`Scheduler`], which the simulator provides. Two
//! implementations come with the crate:
//!
//! - [`EventQueue`] keeps its own virtual clock and runs events only when told
//!   to, which makes runs reproducible
//! - [`TokioScheduler`] spawns a task per event on a tokio runtime, and follows
//!   tokio's clock, including paused time in tests

use std::{
    cmp::Ordering,
    collections::BinaryHeap,
    sync::Mutex,
    time::Duration,
};
use tokio::{runtime::Handle, time::Instant};

/// Work to run once at a later time.
pub type Event = Box<dyn FnOnce() + Send>;

pub trait Scheduler: Send + Sync {
    /// The time since the scheduler started.
    fn now(&self) -> Duration;

    /// Runs `event` once `delay` has passed.
    fn schedule_after(&self, delay: Duration, event: Event);
}

/// A discrete-event queue with a virtual clock.
///
/// Events scheduled for the same instant run in the order they were
/// scheduled. Events may schedule further events while they run.
#[derive(Default)]
pub struct EventQueue {
    state: Mutex<QueueState>,
}

#[derive(Default)]
struct QueueState {
    now: Duration,
    next_seq: u64,
    pending: BinaryHeap<Pending>,
}

struct Pending {
    at: Duration,
    seq: u64,
    event: Event,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // Reversed, so that the heap pops the earliest event first
    fn cmp(&self, other: &Self) -> Ordering {
        (other.at, other.seq).cmp(&(self.at, self.seq))
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of events waiting to run.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Takes the next event due at or before `deadline` and advances the clock
    /// to it. The lock is released before the event runs, so the event may
    /// schedule more.
    fn pop_due(&self, deadline: Option<Duration>) -> Option<Event> {
        let mut state = self.state.lock().unwrap();
        let due = state
            .pending
            .peek()
            .map_or(false, |next| deadline.map_or(true, |deadline| next.at <= deadline));
        if !due {
            return None;
        }
        let next = state.pending.pop()?;
        state.now = next.at;
        Some(next.event)
    }

    /// Runs the next event. Returns false if there was none.
    pub fn step(&self) -> bool {
        match self.pop_due(None) {
            Some(event) => {
                event();
                true
            }
            None => false,
        }
    }

    /// Runs every event due at or before `time`, then sets the clock to
    /// `time`.
    pub fn run_until(&self, time: Duration) {
        while let Some(event) = self.pop_due(Some(time)) {
            event();
        }
        let mut state = self.state.lock().unwrap();
        state.now = state.now.max(time);
    }

    /// Runs events until none are left. Never returns if events keep
    /// rescheduling themselves.
    pub fn run(&self) {
        while self.step() {}
    }
}

impl Scheduler for EventQueue {
    fn now(&self) -> Duration {
        self.state.lock().unwrap().now
    }

    fn schedule_after(&self, delay: Duration, event: Event) {
        let mut state = self.state.lock().unwrap();
        let at = state.now + delay;
        let seq = state.next_seq;
        state.next_seq += 1;
        state.pending.push(Pending { at, seq, event });
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("EventQueue")
            .field("now", &state.now)
            .field("pending", &state.pending.len())
            .finish()
    }
}

/// Runs events as tokio tasks.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
    start: Instant,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            start: Instant::now(),
        }
    }

    /// Uses the runtime this is called from.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn schedule_after(&self, delay: Duration, event: Event) {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            event();
        });
    }
}
