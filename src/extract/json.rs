//! Extraction from the flat JSON feed generation
//!
//! One document per language carries everything as fixed-position arrays:
//! `prehled` (summary), `vysledky` (one row per party, with mandates) and
//! `kraje` (regions keyed by id). Short rows read as missing trailing fields.

use super::ResourceExtractor;
use crate::error::{VolbyError, VolbyResult};
use crate::model::{PartyResult, RegionLeader, ResourceHeaders, SeatAllocation, Summary};
use crate::normalize::{normalize_number, normalize_percentage};
use crate::source::FeedClient;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

static NULL: Value = Value::Null;

fn at(row: &Value, index: usize) -> &Value {
    row.get(index).unwrap_or(&NULL)
}

fn text_at(row: &Value, index: usize) -> Option<String> {
    match at(row, index) {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn unsigned_at(row: &Value, index: usize) -> Option<u64> {
    normalize_number(at(row, index)).and_then(|n| u64::try_from(n).ok())
}

/// Summary from the `prehled` array
pub fn summary_from_document(document: &Value, year: i32) -> VolbyResult<Summary> {
    let row = document
        .get("prehled")
        .filter(|v| v.is_array())
        .ok_or_else(|| VolbyError::not_published(year, "data.json prehled", "summary array missing"))?;

    Ok(Summary {
        wards_total: normalize_number(at(row, 0)),
        wards_processed: normalize_number(at(row, 1)),
        wards_processed_percent: normalize_percentage(at(row, 2)),
        voters_in_roll: normalize_number(at(row, 3)),
        envelopes_issued: normalize_number(at(row, 4)),
        turnout_percent: normalize_percentage(at(row, 5)),
        envelopes_returned: normalize_number(at(row, 6)),
        valid_votes: normalize_number(at(row, 7)),
        valid_votes_percent: normalize_percentage(at(row, 8)),
        ..Summary::default()
    }
    .with_invalid_votes())
}

fn result_rows(document: &Value, year: i32) -> VolbyResult<&Vec<Value>> {
    document
        .get("vysledky")
        .and_then(Value::as_array)
        .ok_or_else(|| VolbyError::not_published(year, "data.json vysledky", "results array missing"))
}

/// Party results from the `vysledky` rows
pub fn parties_from_document(document: &Value, year: i32) -> VolbyResult<Vec<PartyResult>> {
    let mut parties: Vec<PartyResult> = result_rows(document, year)?
        .iter()
        .filter_map(|row| {
            let number = unsigned_at(row, 0).and_then(|n| u32::try_from(n).ok())?;
            Some(PartyResult {
                number,
                name: text_at(row, 1).unwrap_or_default(),
                votes: unsigned_at(row, 2).unwrap_or(0),
                vote_share: normalize_percentage(at(row, 3)).unwrap_or(0.0),
            })
        })
        .collect();
    parties.sort_by(|a, b| b.votes.cmp(&a.votes));
    Ok(parties)
}

/// Seats from `vysledky` rows holding at least one mandate
pub fn seats_from_document(document: &Value, year: i32) -> VolbyResult<Vec<SeatAllocation>> {
    let mut seats: Vec<SeatAllocation> = result_rows(document, year)?
        .iter()
        .filter_map(|row| {
            let mandates = unsigned_at(row, 4).and_then(|n| u32::try_from(n).ok())?;
            (mandates > 0).then(|| SeatAllocation {
                party: text_at(row, 1).unwrap_or_default(),
                mandates,
                color: text_at(row, 5),
            })
        })
        .collect();
    seats.sort_by(|a, b| b.mandates.cmp(&a.mandates));
    Ok(seats)
}

/// Regional leaders from the `kraje` map
///
/// The leading party is given either by number (resolved through
/// `party_names`) or by name.
pub fn regions_from_document(
    document: &Value,
    year: i32,
    party_names: &HashMap<u32, String>,
    resolve: impl Fn(&str) -> String,
) -> VolbyResult<Vec<RegionLeader>> {
    let regions = document
        .get("kraje")
        .and_then(Value::as_object)
        .ok_or_else(|| VolbyError::not_published(year, "data.json kraje", "regions map missing"))?;

    let mut leaders: Vec<RegionLeader> = regions
        .iter()
        .filter_map(|(key, row)| {
            let Ok(region_id) = key.trim().parse::<u32>() else {
                debug!("Skipping region with non-numeric id {:?}", key);
                return None;
            };
            let leading_party = match at(row, 1) {
                Value::Number(n) => n
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .and_then(|n| party_names.get(&n).cloned())
                    .unwrap_or_else(|| n.to_string()),
                Value::String(s) => s
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .and_then(|n| party_names.get(&n).cloned())
                    .unwrap_or_else(|| s.clone()),
                _ => String::new(),
            };
            Some(RegionLeader {
                region_id,
                region_name: text_at(row, 0).unwrap_or_default(),
                leading_party,
                leading_percent: normalize_percentage(at(row, 2)),
                votes: unsigned_at(row, 3),
                processed_percent: normalize_percentage(at(row, 4)),
                color: text_at(row, 5),
                detail_url: resolve(&text_at(row, 6).unwrap_or_default()),
            })
        })
        .collect();
    leaders.sort_by_key(|leader| leader.region_id);
    Ok(leaders)
}

/// Strategy for the flat JSON document
pub struct JsonExtractor<'a> {
    client: FeedClient<'a>,
    document: Option<Value>,
    party_names: HashMap<u32, String>,
}

impl<'a> JsonExtractor<'a> {
    pub fn new(client: FeedClient<'a>) -> Self {
        Self {
            client,
            document: None,
            party_names: HashMap::new(),
        }
    }

    /// Document resource for `lang`
    pub fn document_resource(lang: &str) -> String {
        format!("data.json?xjazyk={}", lang)
    }

    fn document(&mut self) -> VolbyResult<&Value> {
        if self.document.is_none() {
            let resource = Self::document_resource(self.client.lang());
            let body = self.client.fetch_text(&resource)?;
            let document: Value = serde_json::from_str(&body).map_err(|e| {
                VolbyError::not_published(self.client.year(), resource.clone(), e.to_string())
            })?;
            self.document = Some(document);
        }
        Ok(self.document.as_ref().unwrap_or(&NULL))
    }
}

impl ResourceExtractor for JsonExtractor<'_> {
    fn fetch_summary(&mut self) -> VolbyResult<Summary> {
        let year = self.client.year();
        summary_from_document(self.document()?, year)
    }

    fn fetch_parties(&mut self) -> VolbyResult<Vec<PartyResult>> {
        let year = self.client.year();
        let parties = parties_from_document(self.document()?, year)?;
        self.party_names = parties
            .iter()
            .map(|party| (party.number, party.name.clone()))
            .collect();
        Ok(parties)
    }

    fn fetch_seats(&mut self) -> VolbyResult<Vec<SeatAllocation>> {
        let year = self.client.year();
        seats_from_document(self.document()?, year)
    }

    fn fetch_regions(&mut self) -> VolbyResult<Vec<RegionLeader>> {
        if self.party_names.is_empty() {
            self.fetch_parties()?;
        }
        let year = self.client.year();
        self.document()?;
        let document = self.document.as_ref().unwrap_or(&NULL);
        let client = &self.client;
        regions_from_document(document, year, &self.party_names, |link| client.url(link))
    }

    fn source_url(&self) -> String {
        self.client.url(&Self::document_resource(self.client.lang()))
    }

    fn resource_headers(&self) -> &ResourceHeaders {
        self.client.resource_headers()
    }
}
