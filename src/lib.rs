//! volby - Czech parliamentary election results
//!
//! Fetches results published on volby.cz, keeps a per-(year, language)
//! disk cache revalidated by ETag, and falls back to an earlier election
//! while the requested one is not published.
//!
//! ```rust,ignore
//! use volby::{Config, ElectionResults};
//!
//! let results = ElectionResults::from_config(&Config::default());
//! let dataset = results.gather(2025, Some(2021), "en")?;
//! println!("{} parties", dataset.parties.len());
//! ```

pub mod assemble;
pub mod cache;
pub mod canonical;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod model;
pub mod normalize;
pub mod results;
pub mod source;
pub mod ui;

pub use config::Config;
pub use error::{VolbyError, VolbyResult};
pub use model::{Dataset, PartyResult, RegionLeader, SeatAllocation, Summary};
pub use results::ElectionResults;
