//! Result rendering.
//!
//! Text output is one tab-separated line per result; JSON output is one object
//! per line. Every line is flushed as soon as it is written.

use std::io::Write;

use crate::config::OutputFormat;
use crate::errors::{DynoscanError, Result};
use crate::scanner::{MatchResult, MatchSink};
use crate::table_operations::TableDescriptor;

/// Writes tables and matches to `out` in the chosen format.
pub struct Renderer<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    /// Text: the table name. JSON: `{"name":..,"global":..}`.
    pub fn write_table(&mut self, table: &TableDescriptor) -> Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", table.table_name())?,
            OutputFormat::Json => self.write_json(table)?,
        }
        self.out.flush()?;
        Ok(())
    }

    /// Text: `table  kind  location  key  value`, tab separated.
    pub fn write_match(&mut self, found: &MatchResult) -> Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(
                self.out,
                "{}\t{}\t{}\t{}\t{}",
                found.table_name,
                found.matched_on,
                escape_field(&found.location_hint),
                found.item_key.as_deref().unwrap_or("-"),
                escape_field(&found.value)
            )?,
            OutputFormat::Json => self.write_json(found)?,
        }
        self.out.flush()?;
        Ok(())
    }

    fn write_json<T: serde::Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.out, value).map_err(std::io::Error::from)?;
        writeln!(self.out)?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MatchSink for Renderer<W> {
    fn report(&mut self, found: &MatchResult) -> Result<()> {
        self.write_match(found)
    }
}

/// Report a fatal error on `out`, independent of the log filter.
pub fn write_failure<W: Write>(out: &mut W, err: &DynoscanError) -> std::io::Result<()> {
    writeln!(out, "dynoscan: {err}")?;
    out.flush()
}

/// Keep one result per line in text output.
fn escape_field(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\t', "\\t")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}
