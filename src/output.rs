use std::io::{self, Write};

use termcolor::{Color, ColorSpec, WriteColor};

use crate::location::GeoLocation;
use crate::template::Template;

/// How each location is printed.
#[derive(Clone, Debug)]
pub enum OutputFormat {
    /// One rendered template per line.
    Template(Template),
    /// One JSON object per line.
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Template(Template::default())
    }
}

/// Writes locations to a (possibly colored) stream.
pub struct Printer<W> {
    wtr: W,
    format: OutputFormat,
    highlight: ColorSpec,
}

impl<W: WriteColor> Printer<W> {
    /// Wrap a writer; templates are highlighted when it supports color.
    pub fn new(wtr: W, format: OutputFormat) -> Self {
        let mut highlight = ColorSpec::new();
        highlight.set_fg(Some(Color::Red)).set_bold(true);
        Printer {
            wtr,
            format,
            highlight,
        }
    }

    /// Print one location followed by a newline.
    pub fn print(&mut self, location: &GeoLocation) -> io::Result<()> {
        match &self.format {
            OutputFormat::Template(template) => {
                self.wtr.set_color(&self.highlight)?;
                template.write(&mut self.wtr, location)?;
                self.wtr.reset()?;
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.wtr, location)?;
            }
        }
        self.wtr.write_all(b"\n")
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.wtr.flush()
    }

    /// Consume the printer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.wtr
    }
}
