//! Extraction strategies for the two upstream feed generations
//!
//! The results site changed shape between election cycles: older cycles
//! publish HTML tables plus d3 chart scripts, newer ones a flat JSON
//! document. Both are exposed through [`ResourceExtractor`] and selected
//! by [`FeedFormat`].

pub mod html;
pub mod json;
pub mod script;
pub mod table;

pub use html::HtmlExtractor;
pub use json::JsonExtractor;

use crate::error::VolbyResult;
use crate::model::{PartyResult, RegionLeader, ResourceHeaders, SeatAllocation, Summary};
use crate::source::FeedClient;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream payload generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    /// HTML results tables plus d3 chart scripts
    #[default]
    Html,
    /// Single flat JSON document
    Json,
}

impl FeedFormat {
    /// Resource carrying the summary; its ETag drives revalidation
    pub fn primary_resource(&self, lang: &str) -> String {
        match self {
            Self::Html => HtmlExtractor::results_resource(lang),
            Self::Json => JsonExtractor::document_resource(lang),
        }
    }
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html => write!(f, "html"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// One upstream feed generation
///
/// Calls are made in the order summary, parties, seats, regions; later
/// calls may rely on state gathered by earlier ones.
pub trait ResourceExtractor {
    fn fetch_summary(&mut self) -> VolbyResult<Summary>;

    /// Party results sorted by votes, descending
    fn fetch_parties(&mut self) -> VolbyResult<Vec<PartyResult>>;

    /// Seat allocation sorted by mandates, descending
    fn fetch_seats(&mut self) -> VolbyResult<Vec<SeatAllocation>>;

    /// Regional leaders sorted by region id, ascending
    fn fetch_regions(&mut self) -> VolbyResult<Vec<RegionLeader>>;

    /// URL of the primary resource
    fn source_url(&self) -> String;

    /// Response headers of every resource fetched so far
    fn resource_headers(&self) -> &ResourceHeaders;
}

/// Create the extractor for `format` over `client`
pub fn create_extractor<'a>(
    format: FeedFormat,
    client: FeedClient<'a>,
) -> Box<dyn ResourceExtractor + 'a> {
    match format {
        FeedFormat::Html => Box::new(HtmlExtractor::new(client)),
        FeedFormat::Json => Box::new(JsonExtractor::new(client)),
    }
}
