//! Command line interface.
//!
//! ```text
//! dynoscan -q val -t 'table-.*' [--filter-tables | --filter-keys | --filter-data | --filter-all]
//! dynoscan --list-tables
//! ```

use clap::{ArgAction, Parser};
use std::time::Duration;

use crate::config::{AwsConfig, FilterScope, Mode, OutputFormat, RunConfig, ScanRequest};
use crate::errors::{DynoscanError, Result};

#[derive(Debug, Parser)]
#[command(
    name = "dynoscan",
    version,
    about = "Search DynamoDB tables by name, key or item content"
)]
pub struct Cli {
    /// Credentials profile (~/.aws/credentials)
    #[arg(short, long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Region; falls back to the profile or ~/.aws/config default
    #[arg(short, long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Content filter, regex supported
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Table name pattern, regex supported
    #[arg(short, long, default_value = "")]
    pub table: String,

    /// List all available tables and exit
    #[arg(long)]
    pub list_tables: bool,

    /// Include global tables in listing and search
    #[arg(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub include_global_tables: bool,

    /// Match the query against table names only
    #[arg(long)]
    pub filter_tables: bool,

    /// Match the query against key attributes only
    #[arg(long)]
    pub filter_keys: bool,

    /// Match the query against non-key attributes only
    #[arg(long)]
    pub filter_data: bool,

    /// Match the query against keys and data (default)
    #[arg(long)]
    pub filter_all: bool,

    /// Stop searching on the first match found
    #[arg(long)]
    pub stop_first_match: bool,

    /// Custom endpoint, e.g. http://localhost:8000 for DynamoDB Local
    #[arg(long, env = "AWS_ENDPOINT_URL_DYNAMODB")]
    pub endpoint_url: Option<String>,

    /// Connect timeout in seconds
    #[arg(long)]
    pub connect_timeout: Option<f64>,

    /// Read timeout in seconds
    #[arg(long)]
    pub read_timeout: Option<f64>,

    /// Maximum attempts per AWS request
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_retries: Option<u32>,

    /// Skip the STS identity check before running
    #[arg(long)]
    pub skip_identity_check: bool,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Truncate reported values to this many characters (0 = never)
    #[arg(long, default_value_t = crate::config::DEFAULT_MAX_VALUE_LEN)]
    pub max_value_len: usize,

    /// More logging (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Validate the flags and freeze them into a [`RunConfig`].
    pub fn into_config(self) -> Result<RunConfig> {
        let aws = AwsConfig {
            profile: self.profile.filter(|p| !p.is_empty()),
            region: self.region.filter(|r| !r.is_empty()),
            connect_timeout: parse_timeout("--connect-timeout", self.connect_timeout)?,
            read_timeout: parse_timeout("--read-timeout", self.read_timeout)?,
            max_retries: self.max_retries,
            // DynamoDB Local and LocalStack have no STS to ask.
            verify_identity: !self.skip_identity_check && self.endpoint_url.is_none(),
            endpoint_url: self.endpoint_url,
        };

        let mode = if self.list_tables {
            Mode::ListTables {
                include_global: self.include_global_tables,
            }
        } else {
            let scope = FilterScope::from_flags(
                self.filter_tables,
                self.filter_keys,
                self.filter_data,
                self.filter_all,
            )?;
            let request = ScanRequest::new(&self.table, &self.query, scope)?
                .stop_on_first_match(self.stop_first_match)
                .include_global(self.include_global_tables)
                .max_value_len(self.max_value_len);
            Mode::Scan(request)
        };

        Ok(RunConfig {
            aws,
            mode,
            output: self.output,
        })
    }

    /// Default log filter for the verbosity level.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "dynoscan=info,warn",
            2 => "dynoscan=debug,info",
            _ => "trace",
        }
    }
}

fn parse_timeout(flag: &str, secs: Option<f64>) -> Result<Option<Duration>> {
    secs.map(|s| {
        Duration::try_from_secs_f64(s).map_err(|_| {
            DynoscanError::Config(format!("{flag} must be a non-negative number of seconds"))
        })
    })
    .transpose()
}
