//! Per-item content matching.

use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::config::{FilterScope, ScanRequest};
use crate::conversions::{
    Item, attribute_value_to_text, item_key_to_json, item_to_json, truncate_value,
};

/// Location hint for matches that cover a whole item.
pub const WHOLE_ITEM: &str = "*";

/// What part of a table a match was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedOn {
    Name,
    Key,
    Data,
}

impl fmt::Display for MatchedOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchedOn::Name => "name",
            MatchedOn::Key => "key",
            MatchedOn::Data => "data",
        };
        f.write_str(label)
    }
}

/// One match, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    #[serde(rename = "table")]
    pub table_name: String,
    pub matched_on: MatchedOn,
    /// Attribute name, table name for name matches, or `*` for a whole item.
    #[serde(rename = "location")]
    pub location_hint: String,
    /// Primary key of the matched item as compact JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_key: Option<String>,
    pub value: String,
}

/// Applies a request's query pattern and scope to table names and items.
#[derive(Debug, Clone, Copy)]
pub struct ItemMatcher<'a> {
    query: Option<&'a Regex>,
    scope: FilterScope,
    max_value_len: usize,
}

impl<'a> ItemMatcher<'a> {
    pub fn new(request: &'a ScanRequest) -> Self {
        Self {
            query: request.query_pattern.as_ref(),
            scope: request.filter_scope,
            max_value_len: request.max_value_len,
        }
    }

    fn is_match(&self, text: &str) -> bool {
        self.query.is_none_or(|query| query.is_match(text))
    }

    /// Name-only match: the query, if any, must match the table name itself.
    pub fn match_table_name(&self, table: &str) -> Option<MatchResult> {
        self.is_match(table).then(|| MatchResult {
            table_name: table.to_string(),
            matched_on: MatchedOn::Name,
            location_hint: table.to_string(),
            item_key: None,
            value: truncate_value(table, self.max_value_len),
        })
    }

    /// All matches within one item, keys first (key schema order), then data
    /// attributes by name.
    ///
    /// Without a query every item is a single whole-item match whose value is
    /// the item key in the keys scope and the whole item otherwise.
    pub fn match_item(
        &self,
        table: &str,
        item: &Item,
        key_attributes: &[String],
    ) -> Vec<MatchResult> {
        let item_key = item_key_to_json(item, key_attributes);

        let Some(query) = self.query else {
            let (matched_on, value) = match self.scope {
                FilterScope::KeysOnly => (MatchedOn::Key, item_key.clone()),
                _ => (MatchedOn::Data, item_to_json(item)),
            };
            return vec![self.result(table, matched_on, WHOLE_ITEM, &item_key, &value)];
        };

        let mut matches = Vec::new();

        if self.scope.includes_keys() {
            for name in key_attributes {
                if let Some(value) = item.get(name) {
                    let text = attribute_value_to_text(value);
                    if query.is_match(&text) {
                        matches.push(self.result(table, MatchedOn::Key, name, &item_key, &text));
                    }
                }
            }
        }

        if self.scope.includes_data() {
            let mut names: Vec<&String> = item
                .keys()
                .filter(|name| !key_attributes.contains(name))
                .collect();
            names.sort();

            for name in names {
                let text = attribute_value_to_text(&item[name]);
                if query.is_match(&text) {
                    matches.push(self.result(table, MatchedOn::Data, name, &item_key, &text));
                }
            }
        }

        matches
    }

    fn result(
        &self,
        table: &str,
        matched_on: MatchedOn,
        location: &str,
        item_key: &str,
        value: &str,
    ) -> MatchResult {
        MatchResult {
            table_name: table.to_string(),
            matched_on,
            location_hint: location.to_string(),
            item_key: Some(item_key.to_string()),
            value: truncate_value(value, self.max_value_len),
        }
    }
}
