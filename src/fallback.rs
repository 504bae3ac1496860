//! "This year, else that year" around a dataset loader

use crate::error::VolbyResult;
use crate::model::Dataset;
use tracing::warn;

/// Load `year`; if its results are unavailable, load `fallback_year` once.
///
/// Only `DataUnavailable` triggers the fallback. A fallback equal to `year`
/// is ignored, and a failing fallback propagates its own error.
pub fn gather_with_fallback<F>(
    year: i32,
    fallback_year: Option<i32>,
    mut load: F,
) -> VolbyResult<Dataset>
where
    F: FnMut(i32) -> VolbyResult<Dataset>,
{
    match load(year) {
        Ok(mut dataset) => {
            dataset.metadata.mark_requested(year);
            Ok(dataset)
        }
        Err(e) if e.is_data_unavailable() => {
            let Some(fallback) = fallback_year.filter(|fallback| *fallback != year) else {
                return Err(e);
            };
            warn!("{}; falling back to {}", e, fallback);
            let mut dataset = load(fallback)?;
            dataset.metadata.mark_fallback(year, fallback);
            Ok(dataset)
        }
        Err(e) => Err(e),
    }
}
