//! Timer primitives driven by explicit timestamps.
//!
//! Nothing here reads a clock. Callers pass `now` (time since mount) and get
//! back what is due, so tests control time exactly and stopping a task is
//! just dropping or clearing it.

use std::time::Duration;

/// Repeating timer. Ticks missed between polls are coalesced into one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    period: Duration,
    next: Duration,
    running: bool,
}

impl Interval {
    /// First tick is one full `period` after `now`.
    pub fn start(period: Duration, now: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        Self {
            period,
            next: now + period,
            running: true,
        }
    }

    /// True when at least one tick is due. Advances past `now`.
    pub fn poll(&mut self, now: Duration) -> bool {
        if !self.running || now < self.next {
            return false;
        }
        while self.next <= now {
            self.next += self.period;
        }
        true
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Keeps only the latest value and releases it after a quiet period.
#[derive(Debug, Clone, PartialEq)]
pub struct Debouncer<T> {
    pending: Option<(T, Duration)>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> Debouncer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending value; the quiet period restarts from `now`.
    pub fn push(&mut self, value: T, now: Duration, quiet: Duration) {
        self.pending = Some((value, now + quiet));
    }

    /// The pending value once its quiet period has passed.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// One-shot events at absolute times.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule<T> {
    entries: Vec<(Duration, u64, T)>,
    seq: u64,
}

impl<T> Default for Schedule<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            seq: 0,
        }
    }
}

impl<T> Schedule<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(&mut self, when: Duration, event: T) {
        self.entries.push((when, self.seq, event));
        self.seq += 1;
    }

    pub fn after(&mut self, now: Duration, delay: Duration, event: T) {
        self.at(now + delay, event);
    }

    /// Remove and return every event due at `now`, earliest first; events
    /// due at the same time keep insertion order.
    pub fn due(&mut self, now: Duration) -> Vec<T> {
        let (mut due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|(when, _, _)| *when <= now);
        self.entries = rest;
        due.sort_by_key(|(when, seq, _)| (*when, *seq));
        due.into_iter().map(|(_, _, event)| event).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
