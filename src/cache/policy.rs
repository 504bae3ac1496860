//! Freshness rules for cached snapshots
//!
//! | Cached entry              | Decision                         |
//! |---------------------------|----------------------------------|
//! | none                      | full fetch                       |
//! | fresh                     | serve as-is, no network          |
//! | stale, no ETag            | full fetch                       |
//! | stale, ETag               | conditional GET (If-None-Match)  |

use super::store::CacheEntry;
use crate::model::Summary;
use std::time::Duration;

/// Revalidation interval while counting is in progress
pub const PARTIAL_INTERVAL: Duration = Duration::from_secs(60);

/// Revalidation interval once every ward has reported
pub const FINAL_INTERVAL: Duration = Duration::from_secs(3600);

/// How long a snapshot stays fresh, by counting progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreshnessPolicy {
    pub partial: Duration,
    pub final_: Duration,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            partial: PARTIAL_INTERVAL,
            final_: FINAL_INTERVAL,
        }
    }
}

/// Why a full fetch is needed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchReason {
    Missing,
    StaleWithoutEtag,
}

/// What to do with a request, given what is cached
#[derive(Debug, Clone, PartialEq)]
pub enum CacheDecision {
    /// Fetch everything and store it
    Fetch(FetchReason),
    /// Serve the entry without touching the network
    Serve(CacheEntry),
    /// Ask upstream whether the primary resource still matches `etag`
    Revalidate { entry: CacheEntry, etag: String },
}

impl FreshnessPolicy {
    pub fn new(partial: Duration, final_: Duration) -> Self {
        Self { partial, final_ }
    }

    /// Interval that applies to a snapshot with this summary
    pub fn interval(&self, summary: &Summary) -> Duration {
        if summary.is_final() {
            self.final_
        } else {
            self.partial
        }
    }

    /// Stale once `now - checked_at` reaches the interval
    pub fn is_stale(&self, entry: &CacheEntry, now: f64) -> bool {
        now - entry.checked_at >= self.interval(&entry.data.summary).as_secs_f64()
    }

    pub fn decide(&self, entry: Option<CacheEntry>, now: f64) -> CacheDecision {
        let Some(entry) = entry else {
            return CacheDecision::Fetch(FetchReason::Missing);
        };
        if !self.is_stale(&entry, now) {
            return CacheDecision::Serve(entry);
        }
        match entry.etag.clone().filter(|etag| !etag.is_empty()) {
            Some(etag) => CacheDecision::Revalidate { entry, etag },
            None => CacheDecision::Fetch(FetchReason::StaleWithoutEtag),
        }
    }
}
