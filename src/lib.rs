//! dynoscan: search DynamoDB tables by name, key or item content.
//!
//! Lists the tables of a region (optionally merged with its global tables) or
//! scans the tables whose names match a pattern, reporting every table name,
//! key attribute or data attribute that matches a query pattern.

pub mod cli;
pub mod client;
pub mod config;
pub mod conversions;
pub mod dispatch;
pub mod errors;
pub mod output;
pub mod scanner;
pub mod table_operations;

#[cfg(test)]
mod testing;

pub use client::{DynamoTableClient, ScanPage, TableClient};
pub use config::{AwsConfig, FilterScope, Mode, OutputFormat, RunConfig, ScanRequest};
pub use errors::{DynoscanError, Result};
pub use scanner::{MatchResult, MatchSink, MatchedOn, ScanSummary, scan_tables};
pub use table_operations::{TableDescriptor, list_combined_tables};
