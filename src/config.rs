//! Immutable run configuration.
//!
//! Built once from the command line (see [`crate::cli`]) and passed by
//! reference into the dispatcher, enumerator and scanner.

use clap::ValueEnum;
use regex::Regex;
use std::time::Duration;

use crate::errors::{DynoscanError, Result};

/// Default truncation limit for reported values, in characters.
pub const DEFAULT_MAX_VALUE_LEN: usize = 256;

/// Options for building the AWS SDK configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AwsConfig {
    /// Named profile from ~/.aws/credentials and ~/.aws/config.
    pub profile: Option<String>,
    /// Region override. `None` uses the SDK default chain.
    pub region: Option<String>,
    /// Custom endpoint (DynamoDB Local, LocalStack).
    pub endpoint_url: Option<String>,
    pub connect_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,
    /// Maximum SDK attempts, including the first one.
    pub max_retries: Option<u32>,
    /// Call STS GetCallerIdentity before touching DynamoDB.
    pub verify_identity: bool,
}

/// Which part of an item the query pattern is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterScope {
    /// Only table names; no item is read.
    TableNamesOnly,
    /// Key attributes of each item.
    KeysOnly,
    /// Non-key attributes of each item.
    DataOnly,
    /// Keys first, then data.
    #[default]
    All,
}

impl FilterScope {
    /// Pick the scope from the four command line switches.
    ///
    /// At most one may be set; none set means [`FilterScope::All`].
    pub fn from_flags(tables: bool, keys: bool, data: bool, all: bool) -> Result<Self> {
        let selected: Vec<FilterScope> = [
            (tables, FilterScope::TableNamesOnly),
            (keys, FilterScope::KeysOnly),
            (data, FilterScope::DataOnly),
            (all, FilterScope::All),
        ]
        .into_iter()
        .filter_map(|(set, scope)| set.then_some(scope))
        .collect();

        match selected.as_slice() {
            [] => Ok(FilterScope::All),
            [scope] => Ok(*scope),
            _ => Err(DynoscanError::Config(
                "only one of --filter-tables, --filter-keys, --filter-data, --filter-all may be set"
                    .to_string(),
            )),
        }
    }

    pub fn includes_keys(&self) -> bool {
        matches!(self, FilterScope::KeysOnly | FilterScope::All)
    }

    pub fn includes_data(&self) -> bool {
        matches!(self, FilterScope::DataOnly | FilterScope::All)
    }
}

/// What a single scan invocation should do.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Table name filter. `None` selects every table.
    pub name_pattern: Option<Regex>,
    /// Content filter. `None` matches every item.
    pub query_pattern: Option<Regex>,
    pub filter_scope: FilterScope,
    pub stop_on_first_match: bool,
    /// Whether globally replicated tables take part in table selection.
    pub include_global: bool,
    /// Truncation limit for reported values; 0 disables truncation.
    pub max_value_len: usize,
}

impl ScanRequest {
    /// Compile a request from raw patterns. Empty patterns mean "no filter".
    pub fn new(name_pattern: &str, query_pattern: &str, filter_scope: FilterScope) -> Result<Self> {
        Ok(Self {
            name_pattern: compile_pattern("table", name_pattern)?,
            query_pattern: compile_pattern("query", query_pattern)?,
            filter_scope,
            stop_on_first_match: false,
            include_global: true,
            max_value_len: DEFAULT_MAX_VALUE_LEN,
        })
    }

    pub fn stop_on_first_match(mut self, stop: bool) -> Self {
        self.stop_on_first_match = stop;
        self
    }

    pub fn include_global(mut self, include: bool) -> Self {
        self.include_global = include;
        self
    }

    pub fn max_value_len(mut self, len: usize) -> Self {
        self.max_value_len = len;
        self
    }

    /// True if `table_name` passes the name pattern.
    pub fn selects_table(&self, table_name: &str) -> bool {
        self.name_pattern
            .as_ref()
            .is_none_or(|pattern| pattern.is_match(table_name))
    }
}

fn compile_pattern(field: &'static str, pattern: &str) -> Result<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(pattern)
        .map(Some)
        .map_err(|source| DynoscanError::InvalidPattern { field, source })
}

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// The two mutually exclusive things an invocation can do.
#[derive(Debug, Clone)]
pub enum Mode {
    ListTables { include_global: bool },
    Scan(ScanRequest),
}

/// Everything one invocation needs, fixed at startup.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub aws: AwsConfig,
    pub mode: Mode,
    pub output: OutputFormat,
}
