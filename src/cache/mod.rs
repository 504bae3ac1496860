//! Disk cache for fetched datasets
//!
//! Snapshots are keyed by (year, language) and carry the ETag of the
//! primary resource plus the time they were last confirmed upstream.
//!
//! # Snapshot States
//!
//! | State | Network | Description |
//! |-------|---------|-------------|
//! | Miss | full fetch | No readable snapshot of the current version |
//! | Fresh | none | Checked within the interval for its counting progress |
//! | Stale | conditional GET | Revalidated by ETag, or refetched if it has none |

pub mod policy;
pub mod store;

pub use policy::{CacheDecision, FetchReason, FreshnessPolicy, FINAL_INTERVAL, PARTIAL_INTERVAL};
pub use store::{CacheEntry, CacheStore, CachedFile, CACHE_VERSION};
