//! Combined table listing.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::client::TableClient;
use crate::errors::Result;

/// One table as seen by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescriptor {
    pub name: String,
    /// Part of a global (replicated) table group.
    #[serde(rename = "global")]
    pub is_global: bool,
}

impl TableDescriptor {
    pub fn table_name(&self) -> &str {
        &self.name
    }
}

/// List regional and/or global tables as one de-duplicated set, sorted by name.
///
/// A name present in both listings is reported once, as global.
/// Any failing listing fails the whole call; nothing partial is returned.
pub async fn list_combined_tables<C>(
    client: &C,
    include_local: bool,
    include_global: bool,
) -> Result<Vec<TableDescriptor>>
where
    C: TableClient + ?Sized,
{
    let mut merged: BTreeMap<String, bool> = BTreeMap::new();

    if include_local {
        for name in client.list_tables().await? {
            merged.entry(name).or_insert(false);
        }
    }

    if include_global {
        for name in client.list_global_tables().await? {
            merged.insert(name, true);
        }
    }

    debug!(
        count = merged.len(),
        include_local, include_global, "merged table listings"
    );

    Ok(merged
        .into_iter()
        .map(|(name, is_global)| TableDescriptor { name, is_global })
        .collect())
}
