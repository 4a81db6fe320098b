//! Cancellable one-shot and interval timers for a single-threaded host.
//!
//! The queue never sleeps. The owner calls [`TimerQueue::drain_due`] with
//! the current time and handles whatever fired. Ids are never reused, so a
//! cancelled timer can never be confused with a newer one.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TimerId,
    deadline: Instant,
    period: Option<Duration>,
    payload: T,
}

#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T: Clone> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_once(&mut self, deadline: Instant, payload: T) -> TimerId {
        self.push(deadline, None, payload)
    }

    /// Fires first at `first_deadline`, then every `period` until cancelled.
    pub fn schedule_interval(
        &mut self,
        first_deadline: Instant,
        period: Duration,
        payload: T,
    ) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.push(first_deadline, Some(period), payload)
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.entries.len();
        self.entries.clear();
        cancelled
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|entry| entry.deadline).min()
    }

    /// Remove and return every timer due at `now`, earliest first.
    ///
    /// An interval fires at most once per call and is rescheduled to its
    /// next period boundary after `now`; missed periods are coalesced.
    pub fn drain_due(&mut self, now: Instant) -> Vec<(TimerId, T)> {
        let mut due: Vec<(Instant, TimerId, T)> = Vec::new();
        let mut kept = Vec::with_capacity(self.entries.len());

        for mut entry in self.entries.drain(..) {
            if entry.deadline > now {
                kept.push(entry);
                continue;
            }
            due.push((entry.deadline, entry.id, entry.payload.clone()));
            if let Some(period) = entry.period {
                while entry.deadline <= now {
                    entry.deadline += period;
                }
                kept.push(entry);
            }
        }

        self.entries = kept;
        due.sort_by_key(|(deadline, id, _)| (*deadline, *id));
        due.into_iter().map(|(_, id, payload)| (id, payload)).collect()
    }

    fn push(&mut self, deadline: Instant, period: Option<Duration>, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(Entry {
            id,
            deadline,
            period,
            payload,
        });
        id
    }
}
