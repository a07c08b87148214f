//! Pattern scanner.
//!
//! Selects tables by name pattern, reads their items page by page and applies
//! the query pattern according to the filter scope:
//! - `matcher` - Matching of table names and single items
//! - `scan` - The scan loop with early exit and streaming

mod matcher;
mod scan;

pub use matcher::{ItemMatcher, MatchResult, MatchedOn, WHOLE_ITEM};
pub use scan::{ScanSummary, scan_tables};

use crate::errors::Result;

/// Receives matches as soon as the scanner finds them.
pub trait MatchSink {
    fn report(&mut self, found: &MatchResult) -> Result<()>;
}

impl MatchSink for Vec<MatchResult> {
    fn report(&mut self, found: &MatchResult) -> Result<()> {
        self.push(found.clone());
        Ok(())
    }
}
