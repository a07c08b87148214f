//! In-memory [`TableClient`] for unit tests.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::client::{ScanPage, TableClient};
use crate::conversions::Item;
use crate::errors::{DynoscanError, Result};

const PAGE_MARKER: &str = "__page";

/// Build an item from `(name, string value)` pairs.
pub fn item(attrs: &[(&str, &str)]) -> Item {
    attrs
        .iter()
        .map(|(k, v)| (k.to_string(), AttributeValue::S(v.to_string())))
        .collect()
}

/// Scripted tables, pages and failures, with a log of every call made.
#[derive(Default)]
pub struct MockTableClient {
    tables: Vec<String>,
    global_tables: Vec<String>,
    keys: HashMap<String, Vec<String>>,
    pages: HashMap<String, Vec<Vec<Item>>>,
    fail_list: bool,
    fail_global: bool,
    fail_scan: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockTableClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(mut self, names: &[&str]) -> Self {
        self.tables = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_global_tables(mut self, names: &[&str]) -> Self {
        self.global_tables = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Give `table` a key schema and its items, split into pages.
    pub fn with_table_data(mut self, table: &str, keys: &[&str], pages: Vec<Vec<Item>>) -> Self {
        self.keys
            .insert(table.to_string(), keys.iter().map(|k| k.to_string()).collect());
        self.pages.insert(table.to_string(), pages);
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn failing_global_list(mut self) -> Self {
        self.fail_global = true;
        self
    }

    pub fn failing_scan(mut self, table: &str) -> Self {
        self.fail_scan.insert(table.to_string());
        self
    }

    /// Every call so far, e.g. `list_tables`, `describe:orders`, `scan:orders:0`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that read table contents (key schema or items).
    pub fn table_reads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("describe:") || c.starts_with("scan:"))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TableClient for MockTableClient {
    async fn list_tables(&self) -> Result<Vec<String>> {
        self.record("list_tables".to_string());
        if self.fail_list {
            return Err(DynoscanError::Discovery("ListTables unavailable".to_string()));
        }
        Ok(self.tables.clone())
    }

    async fn list_global_tables(&self) -> Result<Vec<String>> {
        self.record("list_global_tables".to_string());
        if self.fail_global {
            return Err(DynoscanError::Discovery(
                "ListGlobalTables unavailable".to_string(),
            ));
        }
        Ok(self.global_tables.clone())
    }

    async fn key_attributes(&self, table: &str) -> Result<Vec<String>> {
        self.record(format!("describe:{table}"));
        Ok(self.keys.get(table).cloned().unwrap_or_default())
    }

    async fn scan_page(&self, table: &str, start_key: Option<Item>) -> Result<ScanPage> {
        let page_index = match start_key.as_ref().and_then(|k| k.get(PAGE_MARKER)) {
            Some(AttributeValue::N(n)) => n.parse::<usize>().unwrap(),
            _ => 0,
        };
        self.record(format!("scan:{table}:{page_index}"));

        if self.fail_scan.contains(table) {
            return Err(DynoscanError::Scan {
                table: table.to_string(),
                message: "Scan unavailable".to_string(),
            });
        }

        let pages = self.pages.get(table).cloned().unwrap_or_default();
        let items = pages.get(page_index).cloned().unwrap_or_default();
        let last_evaluated_key = (page_index + 1 < pages.len()).then(|| {
            let mut key = Item::new();
            key.insert(
                PAGE_MARKER.to_string(),
                AttributeValue::N((page_index + 1).to_string()),
            );
            key
        });

        Ok(ScanPage {
            items,
            last_evaluated_key,
        })
    }
}
