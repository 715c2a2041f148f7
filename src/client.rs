use std::time::Instant;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, RemoteCallFailure, Result};
use crate::location::GeoLocation;

/// Endpoint used by [`GeoLocator::new`].
pub const DEFAULT_BASE_URL: &str = "https://reallyfreegeoip.org/json/";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Client for the remote geolocation API.
///
/// Each lookup is one blocking `GET` followed by one JSON decode. The client
/// keeps no state between calls, so it can be cloned and shared freely.
#[derive(Debug, Clone)]
pub struct GeoLocator {
    base_url: Url,
    http: Client,
}

impl GeoLocator {
    /// Create a client bound to [`DEFAULT_BASE_URL`].
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client bound to another endpoint with the same API shape.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| Error::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "url cannot carry path segments".to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)?;

        Ok(Self {
            base_url: parsed,
            http,
        })
    }

    /// The endpoint this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Location of the caller's own public address.
    ///
    /// The provider infers the address from the connection.
    pub fn get_location(&self) -> std::result::Result<GeoLocation, RemoteCallFailure> {
        self.fetch(self.base_url.clone())
    }

    /// Location of an IP address or host name.
    ///
    /// `target` is not validated locally; whatever the provider makes of it is
    /// returned. It is sent as a single percent-encoded path segment.
    pub fn get_location_for(
        &self,
        target: &str,
    ) -> std::result::Result<GeoLocation, RemoteCallFailure> {
        self.fetch(self.target_url(target))
    }

    fn target_url(&self, target: &str) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base URLs are rejected in with_base_url
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(target);
        }
        url
    }

    fn fetch(&self, url: Url) -> std::result::Result<GeoLocation, RemoteCallFailure> {
        let started = Instant::now();
        debug!(%url, "requesting geolocation");

        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|source| {
                warn!(%url, error = %source, "geolocation request failed");
                RemoteCallFailure::Transport {
                    url: url.to_string(),
                    source,
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|source| RemoteCallFailure::Transport {
                url: url.to_string(),
                source,
            })?;
        debug!(
            %url,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "geolocation response"
        );

        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "geolocation provider returned an error");
            return Err(RemoteCallFailure::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| {
            warn!(%url, error = %source, "undecodable geolocation response");
            RemoteCallFailure::Decode {
                url: url.to_string(),
                body,
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(base: &str, target: &str) -> String {
        GeoLocator::with_base_url(base)
            .unwrap()
            .target_url(target)
            .to_string()
    }

    #[test]
    fn default_endpoint() {
        let client = GeoLocator::new().unwrap();
        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn target_is_appended_as_one_segment() {
        assert_eq!(
            target("https://reallyfreegeoip.org/json/", "8.8.8.8"),
            "https://reallyfreegeoip.org/json/8.8.8.8"
        );
        assert_eq!(
            target("https://reallyfreegeoip.org/json", "example.com"),
            "https://reallyfreegeoip.org/json/example.com"
        );
    }

    #[test]
    fn target_is_percent_encoded() {
        assert_eq!(
            target("http://localhost:8080/json/", "a b/c?d"),
            "http://localhost:8080/json/a%20b%2Fc%3Fd"
        );
    }

    #[test]
    fn ipv6_target_keeps_colons() {
        assert_eq!(
            target("http://localhost/json/", "2001:db8::1"),
            "http://localhost/json/2001:db8::1"
        );
    }

    #[test]
    fn dot_targets_are_normalized_away() {
        // "." and ".." are dot segments in any URL path, even percent-encoded
        assert_eq!(
            target("http://localhost/json/", "."),
            "http://localhost/json"
        );
        assert_eq!(
            target("http://localhost/json/", ".."),
            "http://localhost/json"
        );
        assert_eq!(
            target("http://localhost/json/", "..."),
            "http://localhost/json/..."
        );
    }

    #[test]
    fn rejects_bad_base_urls() {
        assert!(matches!(
            GeoLocator::with_base_url("not a url"),
            Err(Error::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            GeoLocator::with_base_url("mailto:geo@example.com"),
            Err(Error::InvalidBaseUrl { .. })
        ));
    }
}
