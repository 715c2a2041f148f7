use std::fmt;
use std::io::{self, Write};

use crate::error::{Error, Result};
use crate::location::GeoLocation;

/// Template used by the CLI when none is given.
pub const DEFAULT_TEMPLATE: &str = "<{ip}|{country_code}|{region_name}|{city}>";

/// A pre-compiled output template.
///
/// Fields are written as `{field_name}`; `{{` and `}}` produce literal braces.
/// An unclosed `{` is kept as literal text. Rendering is a single pass over
/// the compiled segments, so values are never re-scanned for placeholders.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

#[derive(Clone, Debug, PartialEq)]
enum Segment {
    Literal(String),
    Field(String),
}

impl Template {
    /// Parse a template string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTemplate`] for an empty placeholder (`{}`).
    pub fn compile(source: &str) -> Result<Template> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(c) = rest.chars().next() {
            if rest.starts_with("{{") || rest.starts_with("}}") {
                literal.push(c);
                rest = &rest[2..];
                continue;
            }
            if c == '{' {
                if let Some(end) = rest.find('}') {
                    let name = &rest[1..end];
                    if name.is_empty() {
                        return Err(Error::InvalidTemplate {
                            reason: format!(
                                "empty field name at offset {}",
                                source.len() - rest.len()
                            ),
                        });
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(name.to_string()));
                    rest = &rest[end + 1..];
                    continue;
                }
            }
            literal.push(c);
            rest = &rest[c.len_utf8()..];
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Template { segments })
    }

    /// Parse a template and check every placeholder names a [`GeoLocation`] field.
    pub fn for_locations(source: &str) -> Result<Template> {
        let template = Self::compile(source)?;
        if let Some(unknown) = template
            .fields()
            .into_iter()
            .find(|name| !GeoLocation::FIELDS.iter().any(|f| f.name == *name))
        {
            return Err(Error::InvalidTemplate {
                reason: format!("unknown field {{{unknown}}}, see --list-fields"),
            });
        }
        Ok(template)
    }

    /// Render a location. Unknown fields render as the empty string.
    pub fn render(&self, location: &GeoLocation) -> String {
        let mut out = Vec::with_capacity(64);
        // writing into a Vec cannot fail
        let _ = self.write(&mut out, location);
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Render a location straight into a writer.
    pub fn write<W: Write + ?Sized>(&self, wtr: &mut W, location: &GeoLocation) -> io::Result<()> {
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => wtr.write_all(s.as_bytes())?,
                Segment::Field(name) => {
                    if let Some(value) = location.field(name) {
                        wtr.write_all(value.as_bytes())?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Field names referenced by this template, in order of appearance.
    pub fn fields(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Field(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }
}

impl Default for Template {
    fn default() -> Self {
        Template {
            segments: vec![
                Segment::Literal("<".into()),
                Segment::Field("ip".into()),
                Segment::Literal("|".into()),
                Segment::Field("country_code".into()),
                Segment::Literal("|".into()),
                Segment::Field("region_name".into()),
                Segment::Literal("|".into()),
                Segment::Field("city".into()),
                Segment::Literal(">".into()),
            ],
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => f.write_str(&s.replace('{', "{{").replace('}', "}}"))?,
                Segment::Field(name) => write!(f, "{{{name}}}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn testville() -> GeoLocation {
        GeoLocation {
            ip: "1.2.3.4".into(),
            country_code: "TL".into(),
            country_name: "Testland".into(),
            region_name: "Test Region".into(),
            city: "Testville".into(),
            latitude: 12.5,
            ..Default::default()
        }
    }

    #[test]
    fn default_template_matches_constant() {
        assert_eq!(Template::compile(DEFAULT_TEMPLATE).unwrap(), Template::default());
        assert_eq!(
            Template::default().render(&testville()),
            "<1.2.3.4|TL|Test Region|Testville>"
        );
    }

    #[test]
    fn numbers_and_literals() {
        let t = Template::compile("{city} @ {latitude},{longitude}").unwrap();
        assert_eq!(t.render(&testville()), "Testville @ 12.5,0.0");
    }

    #[test]
    fn escaped_braces() {
        let t = Template::compile("{{ip}} is {ip}}}").unwrap();
        assert_eq!(t.render(&testville()), "{ip} is 1.2.3.4}");
    }

    #[test]
    fn values_are_not_expanded() {
        let loc = GeoLocation {
            city: "{ip}".into(),
            ..testville()
        };
        let t = Template::compile("{city}").unwrap();
        assert_eq!(t.render(&loc), "{ip}");
    }

    #[test]
    fn unclosed_brace_is_literal() {
        let t = Template::compile("city {city} and {unclosed").unwrap();
        assert_eq!(t.render(&testville()), "city Testville and {unclosed");
    }

    #[test]
    fn non_ascii_literals_survive() {
        let t = Template::compile("→ {city} ←").unwrap();
        assert_eq!(t.render(&testville()), "→ Testville ←");
    }

    #[test]
    fn empty_field_is_error() {
        assert!(matches!(
            Template::compile("ip: {}"),
            Err(Error::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn unknown_field_rejected_for_locations() {
        assert!(Template::compile("{asnnum}").is_ok());
        assert!(matches!(
            Template::for_locations("{ip} {asnnum}"),
            Err(Error::InvalidTemplate { .. })
        ));
        assert!(Template::for_locations("{ip} {time_zone} {metro_code}").is_ok());
    }

    #[test]
    fn fields_in_order() {
        let t = Template::compile("{ip}|{city}|{ip}").unwrap();
        assert_eq!(t.fields(), vec!["ip", "city", "ip"]);
    }

    #[test]
    fn display_roundtrip() {
        let source = "<{ip}|{{{country_code}}}|{city}>";
        assert_eq!(Template::compile(source).unwrap().to_string(), source);
    }
}
