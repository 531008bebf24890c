//! Delayed transitions on a deterministic clock
//!
//! The timeline never reads the wall clock. Callers move it forward with
//! [`Timeline::advance`]: tests step it by exact durations, the interactive
//! front end feeds it real elapsed time.

use super::Event;
use std::time::Duration;

/// Which delayed transition a timer drives. At most one of each is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    AutoAdvance,
    RevealResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTransition {
    pub kind: TimerKind,
    pub due: Duration,
    pub event: Event,
}

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    now: Duration,
    pending: Vec<ScheduledTransition>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the timeline was created
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> &[ScheduledTransition] {
        &self.pending
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.pending.iter().any(|t| t.kind == kind)
    }

    /// Schedule `event` to fire `after` from now, replacing a pending timer of the same kind
    pub fn schedule(&mut self, kind: TimerKind, after: Duration, event: Event) {
        self.cancel(kind);
        self.pending.push(ScheduledTransition {
            kind,
            due: self.now + after,
            event,
        });
    }

    /// Returns true if a timer was pending
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.kind != kind);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Time until the earliest pending timer fires
    pub fn next_due_in(&self) -> Option<Duration> {
        self.pending
            .iter()
            .map(|t| t.due.saturating_sub(self.now))
            .min()
    }

    /// Move the clock forward and collect every event that became due, earliest first
    pub fn advance(&mut self, elapsed: Duration) -> Vec<Event> {
        self.now += elapsed;
        let now = self.now;

        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|t| t.due <= now);
        self.pending = waiting;

        due.sort_by_key(|t| t.due);
        due.into_iter().map(|t| t.event).collect()
    }
}
