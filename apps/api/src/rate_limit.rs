use std::time::{Duration, Instant};

use dashmap::{mapref::entry::Entry, DashMap};

/// Rate limit entry - tracks requests per client IP
#[derive(Debug, Clone, Copy)]
pub struct RateLimitEntry {
    pub count: u32,
    pub window_start: Instant,
}

/// Outcome of a single rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after: Duration },
}

/// In-memory per-key request counter.
///
/// A key's window opens on its first request and resets once more than
/// `window` has elapsed. Every request counts, including rejected ones.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    /// The first request of a window is always allowed, whatever the limit.
    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let fresh = RateLimitEntry {
            count: 1,
            window_start: now,
        };

        let mut entry = match self.entries.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(fresh);
                return RateDecision::Allowed;
            }
            Entry::Occupied(slot) => slot.into_ref(),
        };

        let elapsed = now.saturating_duration_since(entry.window_start);
        if elapsed > self.window {
            *entry = fresh;
            return RateDecision::Allowed;
        }

        entry.count = entry.count.saturating_add(1);

        if entry.count > self.max_requests {
            RateDecision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            }
        } else {
            RateDecision::Allowed
        }
    }

    /// Drops entries whose window has expired. Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        self.prune_at(Instant::now())
    }

    pub fn prune_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.window_start) <= self.window);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
