//! Tick scheduler.
//!
//! Turns wall-clock time into a count of due ticks. It is armed while the
//! engine plays and disarmed on pause, completion and teardown. A cancelled
//! ticker never fires again.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next_due: Option<DateTime<Utc>>,
    cancelled: bool,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        let interval = if interval <= Duration::zero() {
            Duration::milliseconds(1)
        } else {
            interval
        };
        Self {
            interval,
            next_due: None,
            cancelled: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Schedule the first tick one interval from `now`.
    pub fn arm(&mut self, now: DateTime<Utc>) {
        if self.cancelled {
            return;
        }
        self.next_due = Some(now + self.interval);
    }

    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.next_due = None;
    }

    /// Consume one tick if it is due at `now`.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.next_due {
            Some(due) if due <= now => {
                self.next_due = Some(due + self.interval);
                true
            }
            _ => false,
        }
    }

    /// Time until the next tick, if armed.
    pub fn until_next(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.next_due
            .map(|due| (due - now).max(Duration::zero()))
    }
}
