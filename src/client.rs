//! DynamoDB client module.
//!
//! Builds the AWS SDK configuration from [`AwsConfig`] and exposes the few
//! DynamoDB calls the tool needs behind the [`TableClient`] trait:
//! - `ListTables` and `ListGlobalTables` for discovery
//! - `DescribeTable` for the key schema
//! - `Scan`, one page at a time

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::Region;
use tracing::{debug, info};

use crate::config::AwsConfig;
use crate::conversions::Item;
use crate::errors::{AwsService, DynoscanError, Result, classify_sdk_error};

/// One page of a table scan.
#[derive(Debug, Clone, Default)]
pub struct ScanPage {
    pub items: Vec<Item>,
    /// Where the next page starts. `None` when the table is exhausted.
    pub last_evaluated_key: Option<Item>,
}

/// The DynamoDB operations the enumerator and scanner rely on.
///
/// Pagination of listings is handled inside the client; scans are paged by
/// the caller so it can stop early.
#[async_trait]
pub trait TableClient: Send + Sync {
    /// Names of all tables in the region.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Names of globally replicated tables that have a replica in the region.
    async fn list_global_tables(&self) -> Result<Vec<String>>;

    /// Key attribute names of `table`, partition key first.
    async fn key_attributes(&self, table: &str) -> Result<Vec<String>>;

    /// Read one page of `table`, starting after `start_key`.
    async fn scan_page(&self, table: &str, start_key: Option<Item>) -> Result<ScanPage>;
}

/// Load the shared SDK configuration.
///
/// Region priority: `config.region` > profile/environment > default chain.
/// Credentials come from the profile if one is named, otherwise from the
/// default chain (env vars, SSO, instance profile, etc).
pub async fn build_sdk_config(config: &AwsConfig) -> Result<SdkConfig> {
    let mut config_loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(profile_name) = &config.profile {
        config_loader = config_loader.profile_name(profile_name);
    }
    if let Some(region) = &config.region {
        config_loader = config_loader.region(Region::new(region.clone()));
    }

    if config.connect_timeout.is_some() || config.read_timeout.is_some() {
        let mut timeouts = TimeoutConfig::builder();
        if let Some(connect) = config.connect_timeout {
            timeouts = timeouts.connect_timeout(connect);
        }
        if let Some(read) = config.read_timeout {
            timeouts = timeouts.read_timeout(read);
        }
        config_loader = config_loader.timeout_config(timeouts.build());
    }

    if let Some(max_retries) = config.max_retries {
        config_loader =
            config_loader.retry_config(RetryConfig::standard().with_max_attempts(max_retries));
    }

    let sdk_config = config_loader.load().await;

    if sdk_config.region().is_none() {
        return Err(DynoscanError::Auth(
            "No AWS region configured. Pass --region, set AWS_REGION or use a profile region."
                .to_string(),
        ));
    }

    Ok(sdk_config)
}

/// Check that the resolved credentials are valid. Returns the caller ARN.
pub async fn verify_identity(sdk_config: &SdkConfig) -> Result<String> {
    let sts = aws_sdk_sts::Client::new(sdk_config);
    let output = sts.get_caller_identity().send().await.map_err(|e| {
        let failure = classify_sdk_error(&e, AwsService::Sts, None);
        DynoscanError::Auth(failure.message)
    })?;

    let arn = output.arn().unwrap_or("unknown").to_string();
    info!(caller = %arn, "resolved AWS identity");
    Ok(arn)
}

/// [`TableClient`] backed by the AWS SDK.
#[derive(Debug, Clone)]
pub struct DynamoTableClient {
    client: Client,
    region: Option<String>,
}

impl DynamoTableClient {
    /// Build the client, pointing it at `endpoint_url` when given.
    pub fn new(sdk_config: &SdkConfig, endpoint_url: Option<&str>) -> Self {
        let mut dynamo_config = aws_sdk_dynamodb::config::Builder::from(sdk_config);

        if let Some(url) = endpoint_url {
            dynamo_config = dynamo_config.endpoint_url(url);
        }

        Self {
            client: Client::from_conf(dynamo_config.build()),
            region: sdk_config.region().map(|r| r.to_string()),
        }
    }

    /// Full session setup: SDK config, optional identity check, client.
    pub async fn connect(config: &AwsConfig) -> Result<Self> {
        let sdk_config = build_sdk_config(config).await?;
        if config.verify_identity {
            verify_identity(&sdk_config).await?;
        }
        let client = Self::new(&sdk_config, config.endpoint_url.as_deref());
        debug!(region = ?client.region, "created DynamoDB client");
        Ok(client)
    }
}

#[async_trait]
impl TableClient for DynamoTableClient {
    async fn list_tables(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut pages = self.client.list_tables().into_paginator().items().send();

        while let Some(name) = pages
            .try_next()
            .await
            .map_err(|e| classify_sdk_error(&e, AwsService::DynamoDB, None).into_discovery())?
        {
            names.push(name);
        }

        debug!(count = names.len(), "listed tables");
        Ok(names)
    }

    async fn list_global_tables(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut start: Option<String> = None;

        loop {
            let output = self
                .client
                .list_global_tables()
                .set_region_name(self.region.clone())
                .set_exclusive_start_global_table_name(start.take())
                .send()
                .await
                .map_err(|e| classify_sdk_error(&e, AwsService::DynamoDB, None).into_discovery())?;

            names.extend(
                output
                    .global_tables()
                    .iter()
                    .filter_map(|t| t.global_table_name().map(str::to_string)),
            );

            match output.last_evaluated_global_table_name() {
                Some(next) => start = Some(next.to_string()),
                None => break,
            }
        }

        debug!(count = names.len(), "listed global tables");
        Ok(names)
    }

    async fn key_attributes(&self, table: &str) -> Result<Vec<String>> {
        let output = self
            .client
            .describe_table()
            .table_name(table)
            .send()
            .await
            .map_err(|e| {
                classify_sdk_error(&e, AwsService::DynamoDB, Some(table)).into_scan(table)
            })?;

        let keys = output
            .table()
            .map(|description| {
                description
                    .key_schema()
                    .iter()
                    .map(|element| element.attribute_name().to_string())
                    .collect()
            })
            .unwrap_or_default();

        Ok(keys)
    }

    async fn scan_page(&self, table: &str, start_key: Option<Item>) -> Result<ScanPage> {
        let output = self
            .client
            .scan()
            .table_name(table)
            .set_exclusive_start_key(start_key)
            .send()
            .await
            .map_err(|e| {
                classify_sdk_error(&e, AwsService::DynamoDB, Some(table)).into_scan(table)
            })?;

        Ok(ScanPage {
            items: output.items.unwrap_or_default(),
            last_evaluated_key: output.last_evaluated_key.filter(|key| !key.is_empty()),
        })
    }
}
