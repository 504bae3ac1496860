//! Cached, revalidating access to election results
//!
//! `ElectionResults` ties the transport, the extraction strategy and the
//! disk cache together. One instance is meant to live for the whole process.

use crate::assemble::fetch_all;
use crate::cache::{CacheDecision, CacheEntry, CacheStore, FreshnessPolicy};
use crate::config::{Config, ConfigManager};
use crate::error::{VolbyError, VolbyResult};
use crate::extract::{create_extractor, FeedFormat};
use crate::fallback::gather_with_fallback;
use crate::model::{unix_now, CacheInfo, Dataset};
use crate::source::{base_url, join_url, FeedClient, HttpResponse, Transport, UreqTransport};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Results service over a transport and a cache directory
pub struct ElectionResults<T: Transport = UreqTransport> {
    transport: T,
    store: CacheStore,
    policy: FreshnessPolicy,
    base_url: String,
    format: FeedFormat,
}

impl ElectionResults<UreqTransport> {
    /// Build the service described by `config`, talking to the real upstream
    pub fn from_config(config: &Config) -> Self {
        let transport =
            UreqTransport::new(config.source.timeout(), config.source.user_agent.clone());
        Self::new(transport, CacheStore::new(ConfigManager::cache_dir(config)))
            .with_policy(FreshnessPolicy::new(
                Duration::from_secs(config.cache.partial_interval_secs),
                Duration::from_secs(config.cache.final_interval_secs),
            ))
            .with_base_url(config.source.base_url.clone())
            .with_format(config.source.format)
    }
}

impl<T: Transport> ElectionResults<T> {
    /// Service with default intervals, HTML feed and the volby.cz base URL
    pub fn new(transport: T, store: CacheStore) -> Self {
        let defaults = Config::default();
        Self {
            transport,
            store,
            policy: FreshnessPolicy::default(),
            base_url: defaults.source.base_url,
            format: defaults.source.format,
        }
    }

    pub fn with_policy(mut self, policy: FreshnessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Base URL template; `{year}` is replaced with the election year
    pub fn with_base_url(mut self, template: impl Into<String>) -> Self {
        self.base_url = template.into();
        self
    }

    pub fn with_format(mut self, format: FeedFormat) -> Self {
        self.format = format;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Dataset for `year`, or for `fallback_year` while `year` is unavailable.
    ///
    /// The language code is upper-cased before use.
    pub fn gather(&self, year: i32, fallback_year: Option<i32>, lang: &str) -> VolbyResult<Dataset> {
        if lang.is_empty() || !lang.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(VolbyError::User(format!("Invalid language code: {:?}", lang)));
        }
        let lang = lang.to_uppercase();
        gather_with_fallback(year, fallback_year, |year| self.dataset(year, &lang))
    }

    /// Dataset for exactly `year`, served from cache when fresh
    pub fn dataset(&self, year: i32, lang: &str) -> VolbyResult<Dataset> {
        let now = unix_now();
        let path = self.store.path(year, lang);

        match self.policy.decide(self.store.load(year, lang), now) {
            CacheDecision::Serve(entry) => {
                info!("Serving cached results for {} ({})", year, lang);
                let info = CacheInfo {
                    hit: true,
                    revalidated: false,
                    path: path_string(&path),
                    checked_at: Some(entry.checked_at),
                    etag: entry.etag,
                };
                Ok(annotate(entry.data, info))
            }
            CacheDecision::Fetch(reason) => {
                info!("Fetching results for {} ({}): {:?}", year, lang, reason);
                let dataset = self.fetch(year, lang, None)?;
                let etag = self.primary_etag(&dataset, lang);
                let checked_at = unix_now();
                self.persist(year, lang, &dataset, etag.as_deref(), checked_at);
                let info = CacheInfo {
                    hit: false,
                    revalidated: false,
                    path: path_string(&path),
                    checked_at: Some(checked_at),
                    etag,
                };
                Ok(annotate(dataset, info))
            }
            CacheDecision::Revalidate { entry, etag } => self.revalidate(year, lang, entry, etag, &path),
        }
    }

    fn revalidate(
        &self,
        year: i32,
        lang: &str,
        entry: CacheEntry,
        etag: String,
        path: &Path,
    ) -> VolbyResult<Dataset> {
        let resource = self.format.primary_resource(lang);
        let url = join_url(&base_url(&self.base_url, year), &resource);
        debug!("Revalidating {} with If-None-Match {}", url, etag);

        let response = self
            .transport
            .get(&url, &[("If-None-Match", etag.as_str())])
            .map_err(|e| VolbyError::DataUnavailable {
                year,
                resource: resource.clone(),
                status: None,
                reason: Some(e.to_string()),
            })?;

        match response.status {
            304 => {
                info!("Results for {} ({}) unchanged upstream", year, lang);
                let checked_at = unix_now();
                self.persist(year, lang, &entry.data, Some(&etag), checked_at);
                let info = CacheInfo {
                    hit: true,
                    revalidated: true,
                    path: path_string(path),
                    checked_at: Some(checked_at),
                    etag: Some(etag),
                };
                Ok(annotate(entry.data, info))
            }
            200 => {
                info!("Results for {} ({}) changed upstream", year, lang);
                let fresh_etag = response.header("etag").map(str::to_string);
                let dataset = self.fetch(year, lang, Some((resource, response)))?;
                let etag = fresh_etag.or_else(|| self.primary_etag(&dataset, lang));
                let checked_at = unix_now();
                self.persist(year, lang, &dataset, etag.as_deref(), checked_at);
                let info = CacheInfo {
                    hit: false,
                    revalidated: true,
                    path: path_string(path),
                    checked_at: Some(checked_at),
                    etag,
                };
                Ok(annotate(dataset, info))
            }
            status => {
                warn!("Revalidation of {} answered with status {}", url, status);
                Err(VolbyError::bad_status(year, resource, status))
            }
        }
    }

    /// Full fetch; `primary` is a response already received for the primary resource
    fn fetch(
        &self,
        year: i32,
        lang: &str,
        primary: Option<(String, HttpResponse)>,
    ) -> VolbyResult<Dataset> {
        let mut client = FeedClient::new(&self.transport, year, lang, base_url(&self.base_url, year));
        if let Some((resource, response)) = primary {
            client.prefill(resource, response);
        }
        let mut extractor = create_extractor(self.format, client);
        fetch_all(extractor.as_mut(), year, lang)
    }

    fn primary_etag(&self, dataset: &Dataset, lang: &str) -> Option<String> {
        dataset
            .metadata
            .resource_header(&self.format.primary_resource(lang), "etag")
            .map(str::to_string)
    }

    fn persist(&self, year: i32, lang: &str, dataset: &Dataset, etag: Option<&str>, checked_at: f64) {
        if let Err(e) = self.store.store(year, lang, dataset, etag, checked_at) {
            warn!("Failed to write cache for {} ({}): {}", year, lang, e);
        }
    }
}

fn annotate(mut dataset: Dataset, info: CacheInfo) -> Dataset {
    dataset.metadata.cache = Some(info);
    dataset
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}
