/// Failure of a single remote geolocation call.
///
/// Every way a lookup can go wrong once the request has been built ends up
/// here: the transport failed, the server answered with a non-success status,
/// or the body could not be decoded into a [`GeoLocation`](crate::GeoLocation).
#[derive(Debug, thiserror::Error)]
pub enum RemoteCallFailure {
    /// The request never produced a response (DNS, connect, TLS, read).
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The response body is not a geolocation JSON object.
    #[error("could not decode response from {url}")]
    Decode {
        url: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RemoteCallFailure {
    /// HTTP status code of the failed call, when the server sent one.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteCallFailure::Status { status, .. } => Some(*status),
            RemoteCallFailure::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            RemoteCallFailure::Decode { .. } => None,
        }
    }

    /// The URL that was requested.
    pub fn url(&self) -> &str {
        match self {
            RemoteCallFailure::Transport { url, .. }
            | RemoteCallFailure::Status { url, .. }
            | RemoteCallFailure::Decode { url, .. } => url,
        }
    }

    /// Raw response body, if one was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            RemoteCallFailure::Status { body, .. } | RemoteCallFailure::Decode { body, .. } => {
                Some(body)
            }
            RemoteCallFailure::Transport { .. } => None,
        }
    }
}

/// Error types for the geolocator library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Base URL could not be parsed or cannot take path segments.
    #[error("invalid base url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Template string is malformed.
    #[error("invalid template: {reason}")]
    InvalidTemplate { reason: String },

    /// The HTTP transport could not be built.
    #[error("could not build http client")]
    Transport(#[source] reqwest::Error),

    /// A remote lookup failed.
    #[error(transparent)]
    Remote(#[from] RemoteCallFailure),
}

/// Convenience type alias for Results using the library error.
pub type Result<T> = std::result::Result<T, Error>;
