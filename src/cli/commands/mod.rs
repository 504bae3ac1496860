//! CLI command implementations

pub mod cache;
pub mod config;
pub mod fetch;

pub use cache::execute as cache;
pub use config::execute as config;
pub use fetch::execute as fetch;
