//! Blocking HTTP access to the volby.cz feed
//!
//! `Transport` is the seam between the extraction layer and the network so
//! the cache policy can be exercised without touching the real upstream.

use crate::error::{TransportError, VolbyError, VolbyResult};
use crate::model::ResourceHeaders;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default per-request deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("volby/", env!("CARGO_PKG_VERSION"));

/// Body markers volby.cz serves with a 200 status for unpublished pages
const NOT_FOUND_MARKERS: &[&str] = &["chyba 404", "page not found"];

/// A fully read HTTP response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are lower-cased
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Blocking HTTP GET capability
///
/// Non-2xx statuses are returned as responses; only failures to obtain a
/// response at all (DNS, connect, timeout, read) are errors.
pub trait Transport {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by a `ureq` agent
pub struct UreqTransport {
    agent: ureq::Agent,
    user_agent: String,
}

impl UreqTransport {
    /// Create a transport whose requests must complete within `timeout`
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            user_agent: user_agent.into(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, USER_AGENT)
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        let mut request = self.agent.get(url).header("User-Agent", self.user_agent.as_str());
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let mut response = request
            .call()
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        let body = if status == 304 {
            String::new()
        } else {
            response
                .body_mut()
                .read_to_string()
                .map_err(|e| TransportError(e.to_string()))?
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Base URL for `year`, substituting `{year}` in the template
pub fn base_url(template: &str, year: i32) -> String {
    template.replace("{year}", &year.to_string())
}

/// Resolve `resource` against `base` the way a browser resolves a link
pub fn join_url(base: &str, resource: &str) -> String {
    Url::parse(base)
        .and_then(|url| url.join(resource))
        .map(String::from)
        .unwrap_or_else(|_| format!("{}{}", base, resource))
}

/// Upstream access for one dataset fetch
///
/// Checks status and "not found" markers, and records the response headers
/// of every resource it fetched.
pub struct FeedClient<'a> {
    transport: &'a dyn Transport,
    year: i32,
    lang: String,
    base_url: String,
    resource_headers: ResourceHeaders,
    prefetched: HashMap<String, HttpResponse>,
}

impl<'a> FeedClient<'a> {
    pub fn new(transport: &'a dyn Transport, year: i32, lang: &str, base_url: String) -> Self {
        Self {
            transport,
            year,
            lang: lang.to_string(),
            base_url,
            resource_headers: ResourceHeaders::new(),
            prefetched: HashMap::new(),
        }
    }

    /// Serve the next fetch of `resource` from an already received response
    pub fn prefill(&mut self, resource: impl Into<String>, response: HttpResponse) {
        self.prefetched.insert(resource.into(), response);
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Absolute URL of `resource`
    pub fn url(&self, resource: &str) -> String {
        join_url(&self.base_url, resource)
    }

    /// Headers of every resource fetched so far
    pub fn resource_headers(&self) -> &ResourceHeaders {
        &self.resource_headers
    }

    /// Fetch `resource` and return its body
    pub fn fetch_text(&mut self, resource: &str) -> VolbyResult<String> {
        let response = match self.prefetched.remove(resource) {
            Some(response) => {
                debug!("Reusing prefetched response for {}", resource);
                response
            }
            None => {
                let url = self.url(resource);
                debug!("GET {}", url);
                self.transport
                    .get(&url, &[])
                    .map_err(|source| VolbyError::Transport {
                        resource: resource.to_string(),
                        source,
                    })?
            }
        };
        self.accept(resource, response)
    }

    fn accept(&mut self, resource: &str, response: HttpResponse) -> VolbyResult<String> {
        if response.status != 200 {
            return Err(VolbyError::bad_status(self.year, resource, response.status));
        }
        self.resource_headers
            .insert(resource.to_string(), response.headers);

        let lowered = response.body.to_lowercase();
        if let Some(marker) = NOT_FOUND_MARKERS.iter().find(|m| lowered.contains(**m)) {
            return Err(VolbyError::DataUnavailable {
                year: self.year,
                resource: resource.to_string(),
                status: Some(response.status),
                reason: Some(format!("body contains '{}'", marker)),
            });
        }
        Ok(response.body)
    }
}
