use crate::http::RateHeaders;
use chrono::{DateTime, Utc};
use std::sync::{PoisonError, RwLock};

/// Snapshot of a source's request budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaSnapshot {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl QuotaSnapshot {
    pub fn is_exhausted(&self, now: DateTime<Utc>) -> bool {
        self.remaining == 0 && self.reset_at > now
    }
}

/// Per-source quota bookkeeping. `None` until the first response with a
/// parseable rate-limit envelope; never goes back to `None`.
#[derive(Debug, Default)]
pub struct QuotaState {
    inner: RwLock<Option<QuotaSnapshot>>,
}

impl QuotaState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<QuotaSnapshot> {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot().is_some()
    }

    pub fn is_exhausted(&self, now: DateTime<Utc>) -> bool {
        self.snapshot().is_some_and(|q| q.is_exhausted(now))
    }

    /// Records what a response reported. The first observation is adopted as
    /// is; later ones can only lower `remaining`. Returns the resulting snapshot
    /// and whether this call was the one that adopted the first observation.
    pub fn observe(&self, rate: RateHeaders) -> (QuotaSnapshot, bool) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let first = guard.is_none();
        let next = match *guard {
            Some(current) => QuotaSnapshot {
                remaining: current.remaining.min(rate.remaining),
                ..current
            },
            None => QuotaSnapshot {
                limit: rate.limit,
                remaining: rate.remaining,
                reset_at: rate.reset_at,
            },
        };
        *guard = Some(next);
        (next, first)
    }
}
