//! Dataset assembly from one extractor

use crate::canonical;
use crate::error::VolbyResult;
use crate::extract::ResourceExtractor;
use crate::model::{unix_now, Dataset, Metadata};
use tracing::{debug, info};

/// Run the four extraction calls in order and stamp the metadata.
///
/// From 2025 on, party labels are mapped to their official names and seat
/// rows sharing an official name are merged.
pub fn fetch_all(
    extractor: &mut dyn ResourceExtractor,
    year: i32,
    lang: &str,
) -> VolbyResult<Dataset> {
    let summary = extractor.fetch_summary()?;
    let mut parties = extractor.fetch_parties()?;
    let mut seats = extractor.fetch_seats()?;
    let mut regions = extractor.fetch_regions()?;
    debug!(
        "Extracted {} parties, {} seat rows, {} regions for {}",
        parties.len(),
        seats.len(),
        regions.len(),
        year
    );

    if canonical::applies_to(year) {
        for party in &mut parties {
            party.name = canonical::canonical_party_name(&party.name);
        }
        for region in &mut regions {
            region.leading_party = canonical::canonical_party_name(&region.leading_party);
        }
        seats = canonical::aggregate_seats(seats);
    }

    let source = extractor.source_url();
    info!("Fetched results for {} from {}", year, source);

    Ok(Dataset {
        metadata: Metadata {
            year,
            lang: lang.to_string(),
            fetched_at: unix_now(),
            source,
            resource_headers: extractor.resource_headers().clone(),
            effective_year: None,
            requested_year: None,
            fallback_used: false,
            cache: None,
        },
        summary,
        parties,
        seats,
        regions,
    })
}
