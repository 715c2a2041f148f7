//! Geolocation lookups for IP addresses and host names.
//!
//! The library wraps a single remote JSON API (by default
//! <https://reallyfreegeoip.org/json/>) behind [`GeoLocator`]. A lookup is
//! one blocking HTTP `GET` and one JSON decode; any failure along the way is a
//! [`RemoteCallFailure`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use geolocator::GeoLocator;
//!
//! let locator = GeoLocator::new()?;
//!
//! // The caller's own public address
//! let me = locator.get_location()?;
//! println!("{me}");
//!
//! // Any IP address or host name
//! let there = locator.get_location_for("example.com")?;
//! println!("{} {}", there.country_code, there.city);
//! # Ok::<(), geolocator::Error>(())
//! ```

pub mod client;
pub mod error;
pub mod input;
pub mod location;
pub mod output;
pub mod template;

pub use crate::client::{GeoLocator, DEFAULT_BASE_URL};
pub use crate::error::{Error, RemoteCallFailure};
pub use crate::location::{GeoLocation, LocationField};
pub use crate::template::Template;
