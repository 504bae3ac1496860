//! Extraction from the HTML/script feed generation
//!
//! Summary and party results come from the `ps2` results page tables,
//! seats and regional leaders from the d3 chart scripts.

use super::script::parse_js_literal;
use super::table::{parse_tables, HtmlTable};
use super::ResourceExtractor;
use crate::error::{VolbyError, VolbyResult};
use crate::model::{PartyResult, RegionLeader, ResourceHeaders, SeatAllocation, Summary};
use crate::normalize::{normalize_number, normalize_percentage, parse_number, parse_percentage};
use crate::source::FeedClient;
use serde_json::Value;
use tracing::{debug, warn};

const DATA_MARKER: &str = "let data";

/// Column keys of the summary table, English and Czech page variants
struct SummaryColumn {
    en: (&'static str, &'static str),
    cz: (&'static str, &'static str),
}

const WARDS_TOTAL: SummaryColumn = SummaryColumn {
    en: ("Wards", "total"),
    cz: ("Okrsky", "celkem"),
};
const WARDS_PROCESSED: SummaryColumn = SummaryColumn {
    en: ("Wards", "proc."),
    cz: ("Okrsky", "zpr."),
};
const WARDS_PERCENT: SummaryColumn = SummaryColumn {
    en: ("Wards", "in %"),
    cz: ("Okrsky", "v %"),
};
const VOTERS: SummaryColumn = SummaryColumn {
    en: ("Voters in the electoral roll", "Voters in the electoral roll"),
    cz: ("Voliči v seznamu", "Voliči v seznamu"),
};
const ISSUED: SummaryColumn = SummaryColumn {
    en: ("Issued envelopes", "Issued envelopes"),
    cz: ("Vydané obálky", "Vydané obálky"),
};
const TURNOUT: SummaryColumn = SummaryColumn {
    en: ("Turnout in %", "Turnout in %"),
    cz: ("Volební účast v %", "Volební účast v %"),
};
const RETURNED: SummaryColumn = SummaryColumn {
    en: ("Returned envelopes", "Returned envelopes"),
    cz: ("Odevzdané obálky", "Odevzdané obálky"),
};
const VALID: SummaryColumn = SummaryColumn {
    en: ("Valid votes", "Valid votes"),
    cz: ("Platné hlasy", "Platné hlasy"),
};
const VALID_PERCENT: SummaryColumn = SummaryColumn {
    en: ("% of valid votes", "% of valid votes"),
    cz: ("% platných hlasů", "% platných hlasů"),
};

fn summary_cell<'t>(table: &'t HtmlTable, column: &SummaryColumn) -> Option<&'t str> {
    table
        .first_row_cell(column.en.0, column.en.1)
        .or_else(|| table.first_row_cell(column.cz.0, column.cz.1))
}

/// Summary from the first table of the results page.
///
/// A table without a two-level header means the page is a placeholder.
pub fn summary_from_tables(tables: &[HtmlTable], year: i32) -> VolbyResult<Summary> {
    let table = tables
        .first()
        .ok_or_else(|| VolbyError::not_published(year, "ps2 summary table", "no tables on page"))?;
    if !table.is_multi_level() {
        return Err(VolbyError::not_published(
            year,
            "ps2 summary table",
            "expected multi-level table header",
        ));
    }

    let number = |column: &SummaryColumn| summary_cell(table, column).and_then(parse_number);
    let percent = |column: &SummaryColumn| summary_cell(table, column).and_then(parse_percentage);

    Ok(Summary {
        wards_total: number(&WARDS_TOTAL),
        wards_processed: number(&WARDS_PROCESSED),
        wards_processed_percent: percent(&WARDS_PERCENT),
        voters_in_roll: number(&VOTERS),
        envelopes_issued: number(&ISSUED),
        turnout_percent: percent(&TURNOUT),
        envelopes_returned: number(&RETURNED),
        valid_votes: number(&VALID),
        valid_votes_percent: percent(&VALID_PERCENT),
        ..Summary::default()
    }
    .with_invalid_votes())
}

/// Party results from every table after the summary, columns taken positionally
/// as (number, name, votes, percent).
pub fn parties_from_tables(tables: &[HtmlTable], year: i32) -> VolbyResult<Vec<PartyResult>> {
    if tables.len() < 2 {
        return Err(VolbyError::not_published(
            year,
            "ps2 party tables",
            "party tables missing",
        ));
    }

    let mut parties: Vec<PartyResult> = tables[1..]
        .iter()
        .flat_map(|table| table.rows.iter())
        .filter_map(|row| {
            let number = row.first().and_then(|c| parse_number(c))?;
            let name = row.get(1)?.clone();
            let votes = row.get(2).and_then(|c| parse_number(c));
            let share = row.get(3).and_then(|c| parse_percentage(c));
            let Ok(number) = u32::try_from(number) else {
                debug!("Skipping party row with number {}", number);
                return None;
            };
            Some(PartyResult {
                number,
                name,
                votes: votes.and_then(|v| u64::try_from(v).ok()).unwrap_or(0),
                vote_share: share.unwrap_or(0.0),
            })
        })
        .collect();

    parties.sort_by(|a, b| b.votes.cmp(&a.votes));
    Ok(parties)
}

fn text_field(object: &Value, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Seat allocation from the `d3_rects` chart script
pub fn seats_from_script(script: &str) -> Vec<SeatAllocation> {
    let Some(Value::Array(items)) = parse_js_literal(script, DATA_MARKER, '[') else {
        warn!("Seat chart data not found or unreadable, treating as no seats");
        return vec![];
    };

    let mut seats: Vec<SeatAllocation> = items
        .iter()
        .map(|item| SeatAllocation {
            party: text_field(item, "party").unwrap_or_default(),
            mandates: item
                .get("mandate")
                .and_then(normalize_number)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0),
            color: text_field(item, "color"),
        })
        .collect();
    seats.sort_by(|a, b| b.mandates.cmp(&a.mandates));
    seats
}

/// Regional leaders from the `d3_mapa` chart script; `link` is resolved with `resolve`
pub fn regions_from_script(script: &str, resolve: impl Fn(&str) -> String) -> Vec<RegionLeader> {
    let Some(Value::Object(map)) = parse_js_literal(script, DATA_MARKER, '{') else {
        warn!("Region map data not found or unreadable, treating as no regions");
        return vec![];
    };

    let mut leaders: Vec<RegionLeader> = map
        .iter()
        .filter_map(|(key, raw)| {
            let Ok(region_id) = key.trim().parse::<u32>() else {
                debug!("Skipping region with non-numeric id {:?}", key);
                return None;
            };
            let field = |name: &str| raw.get(name).unwrap_or(&Value::Null);
            Some(RegionLeader {
                region_id,
                region_name: text_field(raw, "region").unwrap_or_default(),
                leading_party: text_field(raw, "party").unwrap_or_default(),
                leading_percent: normalize_percentage(field("percent")),
                votes: normalize_number(field("votes")).and_then(|v| u64::try_from(v).ok()),
                processed_percent: normalize_percentage(field("processed")),
                color: text_field(raw, "color"),
                detail_url: resolve(&text_field(raw, "link").unwrap_or_default()),
            })
        })
        .collect();
    leaders.sort_by_key(|leader| leader.region_id);
    leaders
}

/// Strategy for the HTML results page plus d3 chart scripts
pub struct HtmlExtractor<'a> {
    client: FeedClient<'a>,
    tables: Option<Vec<HtmlTable>>,
}

impl<'a> HtmlExtractor<'a> {
    pub fn new(client: FeedClient<'a>) -> Self {
        Self {
            client,
            tables: None,
        }
    }

    /// Results page resource for `lang`
    pub fn results_resource(lang: &str) -> String {
        format!("ps2?xjazyk={}", lang)
    }

    fn results_tables(&mut self) -> VolbyResult<&[HtmlTable]> {
        if self.tables.is_none() {
            let resource = Self::results_resource(self.client.lang());
            let html = self.client.fetch_text(&resource)?;
            let tables = parse_tables(&html);
            debug!("Parsed {} tables from {}", tables.len(), resource);
            self.tables = Some(tables);
        }
        Ok(self.tables.as_deref().unwrap_or_default())
    }
}

impl ResourceExtractor for HtmlExtractor<'_> {
    fn fetch_summary(&mut self) -> VolbyResult<Summary> {
        let year = self.client.year();
        summary_from_tables(self.results_tables()?, year)
    }

    fn fetch_parties(&mut self) -> VolbyResult<Vec<PartyResult>> {
        let year = self.client.year();
        parties_from_tables(self.results_tables()?, year)
    }

    fn fetch_seats(&mut self) -> VolbyResult<Vec<SeatAllocation>> {
        let resource = format!("d3_rects?xjazyk={}", self.client.lang());
        let script = self.client.fetch_text(&resource)?;
        Ok(seats_from_script(&script))
    }

    fn fetch_regions(&mut self) -> VolbyResult<Vec<RegionLeader>> {
        let resource = format!("d3_mapa?xjazyk={}", self.client.lang());
        let script = self.client.fetch_text(&resource)?;
        let client = &self.client;
        Ok(regions_from_script(&script, |link| client.url(link)))
    }

    fn source_url(&self) -> String {
        self.client.url(&Self::results_resource(self.client.lang()))
    }

    fn resource_headers(&self) -> &ResourceHeaders {
        self.client.resource_headers()
    }
}
