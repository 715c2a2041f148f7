use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Geolocation details for one IP address or host name.
///
/// Decoded from the provider's JSON object. Keys are underscore separated and
/// map one-to-one onto the fields below. Keys missing from the response (or
/// sent as `null`) leave the field at its zero value; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GeoLocation {
    #[serde(deserialize_with = "null_as_default")]
    pub ip: String,
    #[serde(deserialize_with = "null_as_default")]
    pub country_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub country_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub region_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub region_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(deserialize_with = "null_as_default")]
    pub zip_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub time_zone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub latitude: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub longitude: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub metro_code: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Describes a field that can be used in output templates.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LocationField {
    /// Name of the field as used in templates
    pub name: &'static str,
    /// Human-readable description of the field
    pub description: &'static str,
    /// Example value for documentation
    pub example: &'static str,
}

impl GeoLocation {
    /// Every field of a [`GeoLocation`], in declaration order.
    pub const FIELDS: &'static [LocationField] = &[
        LocationField {
            name: "ip",
            description: "The IP address the location belongs to",
            example: "93.184.216.34",
        },
        LocationField {
            name: "country_code",
            description: "ISO 3166-1 alpha-2 country code",
            example: "US",
        },
        LocationField {
            name: "country_name",
            description: "Country name",
            example: "United States",
        },
        LocationField {
            name: "region_code",
            description: "Region or state code",
            example: "CA",
        },
        LocationField {
            name: "region_name",
            description: "Region or state name",
            example: "California",
        },
        LocationField {
            name: "city",
            description: "City name",
            example: "Los Angeles",
        },
        LocationField {
            name: "zip_code",
            description: "ZIP or postal code",
            example: "90009",
        },
        LocationField {
            name: "time_zone",
            description: "IANA time zone identifier",
            example: "America/Los_Angeles",
        },
        LocationField {
            name: "latitude",
            description: "Latitude in decimal degrees",
            example: "34.0544",
        },
        LocationField {
            name: "longitude",
            description: "Longitude in decimal degrees",
            example: "-118.2441",
        },
        LocationField {
            name: "metro_code",
            description: "US metro (DMA) code, 0 when unknown",
            example: "803",
        },
    ];

    /// Textual value of the field called `name`, or `None` for an unknown name.
    ///
    /// Floats use the shortest representation that round-trips.
    pub fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        let value = match name {
            "ip" => Cow::Borrowed(self.ip.as_str()),
            "country_code" => Cow::Borrowed(self.country_code.as_str()),
            "country_name" => Cow::Borrowed(self.country_name.as_str()),
            "region_code" => Cow::Borrowed(self.region_code.as_str()),
            "region_name" => Cow::Borrowed(self.region_name.as_str()),
            "city" => Cow::Borrowed(self.city.as_str()),
            "zip_code" => Cow::Borrowed(self.zip_code.as_str()),
            "time_zone" => Cow::Borrowed(self.time_zone.as_str()),
            "latitude" => Cow::Owned(ryu::Buffer::new().format(self.latitude).to_owned()),
            "longitude" => Cow::Owned(ryu::Buffer::new().format(self.longitude).to_owned()),
            "metro_code" => Cow::Owned(itoa::Buffer::new().format(self.metro_code).to_owned()),
            _ => return None,
        };
        Some(value)
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ip)?;
        let place = [
            self.city.as_str(),
            self.region_name.as_str(),
            self.country_name.as_str(),
        ];
        let mut first = true;
        for part in place.iter().filter(|p| !p.is_empty()) {
            f.write_str(if first { ": " } else { ", " })?;
            f.write_str(part)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_body_leaves_zero_values() {
        let loc: GeoLocation =
            serde_json::from_str(r#"{"ip":"1.2.3.4","country_name":"Testland","city":"Testville"}"#)
                .unwrap();
        assert_eq!(loc.ip, "1.2.3.4");
        assert_eq!(loc.country_name, "Testland");
        assert_eq!(loc.city, "Testville");
        assert_eq!(loc.country_code, "");
        assert_eq!(loc.zip_code, "");
        assert_eq!(loc.latitude, 0.0);
        assert_eq!(loc.metro_code, 0);
    }

    #[test]
    fn full_provider_body() {
        let body = r#"{
            "ip": "8.8.8.8",
            "country_code": "US",
            "country_name": "United States",
            "region_code": "",
            "region_name": "",
            "city": "",
            "zip_code": "",
            "time_zone": "America/Chicago",
            "latitude": 37.751,
            "longitude": -97.822,
            "metro_code": 0
        }"#;
        let loc: GeoLocation = serde_json::from_str(body).unwrap();
        assert_eq!(loc.country_code, "US");
        assert_eq!(loc.time_zone, "America/Chicago");
        assert_eq!(loc.latitude, 37.751);
        assert_eq!(loc.longitude, -97.822);
    }

    #[test]
    fn nulls_and_unknown_keys() {
        let loc: GeoLocation =
            serde_json::from_str(r#"{"ip":"1.1.1.1","city":null,"metro_code":null,"asn":13335}"#)
                .unwrap();
        assert_eq!(loc.ip, "1.1.1.1");
        assert_eq!(loc.city, "");
        assert_eq!(loc.metro_code, 0);
    }

    #[test]
    fn wrong_type_is_rejected() {
        assert!(serde_json::from_str::<GeoLocation>(r#"{"latitude":"north"}"#).is_err());
        assert!(serde_json::from_str::<GeoLocation>(r#"["1.2.3.4"]"#).is_err());
    }

    #[test]
    fn every_listed_field_resolves() {
        let loc = GeoLocation::default();
        for field in GeoLocation::FIELDS {
            assert!(loc.field(field.name).is_some(), "missing {}", field.name);
        }
        assert!(loc.field("asnnum").is_none());
    }

    #[test]
    fn numeric_fields_format() {
        let loc = GeoLocation {
            latitude: 34.0544,
            longitude: -118.2441,
            metro_code: 803,
            ..Default::default()
        };
        assert_eq!(loc.field("latitude").unwrap(), "34.0544");
        assert_eq!(loc.field("longitude").unwrap(), "-118.2441");
        assert_eq!(loc.field("metro_code").unwrap(), "803");
        assert_eq!(GeoLocation::default().field("latitude").unwrap(), "0.0");
    }

    #[test]
    fn display_skips_empty_parts() {
        let loc = GeoLocation {
            ip: "1.2.3.4".into(),
            country_name: "Testland".into(),
            city: "Testville".into(),
            ..Default::default()
        };
        assert_eq!(loc.to_string(), "1.2.3.4: Testville, Testland");
        assert_eq!(GeoLocation::default().to_string(), "");
    }
}
