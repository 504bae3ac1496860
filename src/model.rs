//! Domain records returned to callers and persisted in the cache
//!
//! Every record derives serde so the on-disk snapshot is an explicit,
//! field-by-field encoding of these types.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response headers per upstream resource, header names lower-cased
pub type ResourceHeaders = BTreeMap<String, BTreeMap<String, String>>;

/// Current time as fractional unix seconds
pub fn unix_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Votes received by one competing subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyResult {
    /// Ballot draw number, unique within a dataset
    pub number: u32,
    pub name: String,
    pub votes: u64,
    /// Share of valid votes in percent
    pub vote_share: f64,
}

/// Seats won by one party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatAllocation {
    pub party: String,
    pub mandates: u32,
    pub color: Option<String>,
}

/// Leading party in one of the 14 administrative regions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionLeader {
    pub region_id: u32,
    pub region_name: String,
    pub leading_party: String,
    pub leading_percent: Option<f64>,
    pub votes: Option<u64>,
    /// Counted wards in the region, 0..=100
    pub processed_percent: Option<f64>,
    pub color: Option<String>,
    pub detail_url: String,
}

/// National turnout and counting progress
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub wards_total: Option<i64>,
    pub wards_processed: Option<i64>,
    pub wards_processed_percent: Option<f64>,
    pub voters_in_roll: Option<i64>,
    pub envelopes_issued: Option<i64>,
    pub turnout_percent: Option<f64>,
    pub envelopes_returned: Option<i64>,
    pub valid_votes: Option<i64>,
    pub valid_votes_percent: Option<f64>,
    pub invalid_votes: Option<i64>,
    pub invalid_votes_percent: Option<f64>,
}

impl Summary {
    /// Fill `invalid_votes` and its percentage from returned envelopes and valid votes
    pub fn with_invalid_votes(mut self) -> Self {
        match (self.envelopes_returned, self.valid_votes) {
            (Some(returned), Some(valid)) => {
                let invalid = returned - valid;
                self.invalid_votes = Some(invalid);
                self.invalid_votes_percent = (returned != 0)
                    .then(|| (100.0 * invalid as f64 / returned as f64 * 100.0).round() / 100.0);
            }
            _ => {
                self.invalid_votes = None;
                self.invalid_votes_percent = None;
            }
        }
        self
    }

    /// Counting is finished once every ward has reported
    pub fn is_final(&self) -> bool {
        self.wards_processed_percent.is_some_and(|pct| pct >= 100.0)
    }
}

/// How the cache answered a request; computed at read time, never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheInfo {
    pub hit: bool,
    pub revalidated: bool,
    pub path: String,
    pub checked_at: Option<f64>,
    pub etag: Option<String>,
}

/// Provenance of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub year: i32,
    pub lang: String,
    pub fetched_at: f64,
    pub source: String,
    #[serde(default)]
    pub resource_headers: ResourceHeaders,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_year: Option<i32>,
    #[serde(default)]
    pub fallback_used: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheInfo>,
}

impl Metadata {
    /// Stamp a dataset served for the year that was asked for
    pub fn mark_requested(&mut self, year: i32) {
        self.effective_year = Some(year);
        self.requested_year = Some(year);
        self.fallback_used = false;
    }

    /// Stamp a dataset served from `fallback_year` instead of `requested_year`
    pub fn mark_fallback(&mut self, requested_year: i32, fallback_year: i32) {
        self.effective_year = Some(fallback_year);
        self.requested_year = Some(requested_year);
        self.fallback_used = true;
    }

    /// Header value recorded for `resource`, looked up case-insensitively
    pub fn resource_header(&self, resource: &str, name: &str) -> Option<&str> {
        self.resource_headers
            .get(resource)?
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Everything the dashboard needs for one election
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub metadata: Metadata,
    pub summary: Summary,
    #[serde(default)]
    pub parties: Vec<PartyResult>,
    #[serde(default)]
    pub seats: Vec<SeatAllocation>,
    #[serde(default)]
    pub regions: Vec<RegionLeader>,
}

impl Dataset {
    /// Copy of this dataset without the read-time cache annotation
    pub fn without_cache_info(&self) -> Self {
        let mut snapshot = self.clone();
        snapshot.metadata.cache = None;
        snapshot
    }
}
