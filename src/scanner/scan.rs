//! Pattern scan over the selected tables.

use std::time::Instant;
use tracing::{debug, info};

use crate::client::TableClient;
use crate::config::{FilterScope, ScanRequest};
use crate::errors::Result;
use crate::scanner::MatchSink;
use crate::scanner::matcher::{ItemMatcher, MatchResult};
use crate::table_operations::list_combined_tables;

/// Counters for one scan invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanSummary {
    pub tables_selected: usize,
    pub tables_scanned: usize,
    pub items_scanned: usize,
    pub matches: usize,
    /// Stopped at the first match.
    pub stopped_early: bool,
    pub duration_ms: f64,
}

/// Whether to keep going after a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Scan every table selected by `request`, streaming matches to `sink`.
///
/// Tables are visited in name order, items in page order. Any failure to read
/// a table aborts the whole scan; matches already handed to `sink` stay there.
pub async fn scan_tables<C, S>(
    client: &C,
    request: &ScanRequest,
    sink: &mut S,
) -> Result<ScanSummary>
where
    C: TableClient + ?Sized,
    S: MatchSink + ?Sized,
{
    let start = Instant::now();

    let selected: Vec<String> = list_combined_tables(client, true, request.include_global)
        .await?
        .into_iter()
        .filter(|table| request.selects_table(&table.name))
        .map(|table| table.name)
        .collect();

    let mut summary = ScanSummary {
        tables_selected: selected.len(),
        ..ScanSummary::default()
    };
    debug!(tables = ?selected, scope = ?request.filter_scope, "selected tables");

    let matcher = ItemMatcher::new(request);
    for table in &selected {
        summary.tables_scanned += 1;
        let flow = scan_one(client, request, &matcher, table, sink, &mut summary).await?;
        if flow == Flow::Stop {
            summary.stopped_early = true;
            break;
        }
    }

    summary.duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    info!(
        tables_selected = summary.tables_selected,
        tables_scanned = summary.tables_scanned,
        items_scanned = summary.items_scanned,
        matches = summary.matches,
        stopped_early = summary.stopped_early,
        duration_ms = summary.duration_ms,
        "scan finished"
    );
    Ok(summary)
}

async fn scan_one<C, S>(
    client: &C,
    request: &ScanRequest,
    matcher: &ItemMatcher<'_>,
    table: &str,
    sink: &mut S,
    summary: &mut ScanSummary,
) -> Result<Flow>
where
    C: TableClient + ?Sized,
    S: MatchSink + ?Sized,
{
    if request.filter_scope == FilterScope::TableNamesOnly {
        return match matcher.match_table_name(table) {
            Some(found) => report(request, sink, summary, found),
            None => Ok(Flow::Continue),
        };
    }

    let key_attributes = client.key_attributes(table).await?;
    debug!(table, keys = ?key_attributes, "scanning table");

    let mut start_key = None;
    let mut page = 0usize;
    loop {
        let scanned = client.scan_page(table, start_key).await?;
        debug!(table, page, items = scanned.items.len(), "read page");

        for item in &scanned.items {
            summary.items_scanned += 1;
            for found in matcher.match_item(table, item, &key_attributes) {
                if report(request, sink, summary, found)? == Flow::Stop {
                    return Ok(Flow::Stop);
                }
            }
        }

        match scanned.last_evaluated_key {
            Some(next) => {
                start_key = Some(next);
                page += 1;
            }
            None => return Ok(Flow::Continue),
        }
    }
}

fn report<S>(
    request: &ScanRequest,
    sink: &mut S,
    summary: &mut ScanSummary,
    found: MatchResult,
) -> Result<Flow>
where
    S: MatchSink + ?Sized,
{
    sink.report(&found)?;
    summary.matches += 1;
    if request.stop_on_first_match {
        Ok(Flow::Stop)
    } else {
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DynoscanError;
    use crate::scanner::matcher::MatchedOn;
    use crate::testing::{MockTableClient, item};

    fn request(name: &str, query: &str, scope: FilterScope) -> ScanRequest {
        ScanRequest::new(name, query, scope).unwrap()
    }

    fn tables_of(matches: &[MatchResult]) -> Vec<&str> {
        matches.iter().map(|m| m.table_name.as_str()).collect()
    }

    fn orders_client() -> MockTableClient {
        MockTableClient::new()
            .with_tables(&["orders-us", "orders-eu", "users"])
            .with_table_data(
                "orders-us",
                &["id"],
                vec![vec![item(&[("id", "us-1"), ("status", "shipped")])]],
            )
            .with_table_data(
                "orders-eu",
                &["id"],
                vec![vec![item(&[("id", "eu-1"), ("status", "shipped")])]],
            )
            .with_table_data(
                "users",
                &["id"],
                vec![vec![item(&[("id", "u-1"), ("status", "shipped")])]],
            )
    }

    #[tokio::test]
    async fn name_pattern_selects_matching_tables() {
        let client = orders_client();
        let mut found: Vec<MatchResult> = Vec::new();

        let req = request("orders-.*", "", FilterScope::TableNamesOnly);
        let summary = scan_tables(&client, &req, &mut found).await.unwrap();

        assert_eq!(summary.tables_selected, 2);
        assert_eq!(tables_of(&found), vec!["orders-eu", "orders-us"]);
    }

    #[tokio::test]
    async fn table_names_scope_reads_no_items() {
        let client = orders_client();
        let mut found: Vec<MatchResult> = Vec::new();

        let req = request("", "shipped", FilterScope::TableNamesOnly);
        scan_tables(&client, &req, &mut found).await.unwrap();

        assert!(found.is_empty());
        assert!(client.table_reads().is_empty());

        let mut found: Vec<MatchResult> = Vec::new();
        let req = request("", "users", FilterScope::TableNamesOnly);
        scan_tables(&client, &req, &mut found).await.unwrap();

        assert_eq!(tables_of(&found), vec!["users"]);
        assert_eq!(found[0].matched_on, MatchedOn::Name);
        assert!(client.table_reads().is_empty());
    }

    #[tokio::test]
    async fn stop_on_first_match_halts_everything() {
        let client = orders_client();
        let mut found: Vec<MatchResult> = Vec::new();
        let req = request("", "shipped", FilterScope::All).stop_on_first_match(true);

        let summary = scan_tables(&client, &req, &mut found).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].table_name, "orders-eu");
        assert!(summary.stopped_early);
        assert_eq!(
            client.table_reads(),
            vec!["describe:orders-eu", "scan:orders-eu:0"]
        );
    }

    #[tokio::test]
    async fn stop_on_first_match_ends_inside_the_first_item() {
        let client = MockTableClient::new().with_tables(&["t"]).with_table_data(
            "t",
            &["pk"],
            vec![
                vec![
                    item(&[("pk", "hit-0"), ("a", "hit-a"), ("b", "hit-b")]),
                    item(&[("pk", "hit-1")]),
                ],
                vec![item(&[("pk", "hit-2"), ("a", "hit-c")])],
            ],
        );
        let mut found: Vec<MatchResult> = Vec::new();
        let req = request("", "hit", FilterScope::All).stop_on_first_match(true);

        let summary = scan_tables(&client, &req, &mut found).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].matched_on, MatchedOn::Key);
        assert_eq!(found[0].location_hint, "pk");
        assert_eq!(summary.items_scanned, 1);
        assert!(summary.stopped_early);
        assert_eq!(client.table_reads(), vec!["describe:t", "scan:t:0"]);
    }

    #[tokio::test]
    async fn without_stop_every_match_is_collected() {
        let client = orders_client();
        let mut found: Vec<MatchResult> = Vec::new();

        let req = request("", "shipped", FilterScope::DataOnly);
        let summary = scan_tables(&client, &req, &mut found).await.unwrap();

        assert_eq!(tables_of(&found), vec!["orders-eu", "orders-us", "users"]);
        assert_eq!(summary.matches, 3);
        assert_eq!(summary.items_scanned, 3);
        assert!(!summary.stopped_early);
    }

    #[tokio::test]
    async fn empty_query_lists_every_item() {
        let client = MockTableClient::new()
            .with_tables(&["a", "b"])
            .with_table_data(
                "a",
                &["pk"],
                vec![
                    vec![item(&[("pk", "1")]), item(&[("pk", "2")])],
                    vec![item(&[("pk", "3")])],
                ],
            )
            .with_table_data("b", &["pk"], vec![vec![item(&[("pk", "4")])]]);
        let mut found: Vec<MatchResult> = Vec::new();

        let req = request("", "", FilterScope::DataOnly);
        let summary = scan_tables(&client, &req, &mut found).await.unwrap();

        assert_eq!(found.len(), 4);
        assert_eq!(summary.items_scanned, 4);
        assert_eq!(tables_of(&found), vec!["a", "a", "a", "b"]);
    }

    #[tokio::test]
    async fn every_page_is_read_in_order() {
        let client = MockTableClient::new().with_tables(&["events"]).with_table_data(
            "events",
            &["pk"],
            vec![
                vec![item(&[("pk", "e1"), ("kind", "click")])],
                vec![item(&[("pk", "e2"), ("kind", "view")])],
                vec![item(&[("pk", "e3"), ("kind", "click")])],
            ],
        );
        let mut found: Vec<MatchResult> = Vec::new();

        let req = request("", "click", FilterScope::DataOnly);
        scan_tables(&client, &req, &mut found).await.unwrap();

        let keys: Vec<_> = found.iter().filter_map(|m| m.item_key.as_deref()).collect();
        assert_eq!(keys, vec![r#"{"pk":"e1"}"#, r#"{"pk":"e3"}"#]);
        assert_eq!(
            client.table_reads(),
            vec![
                "describe:events",
                "scan:events:0",
                "scan:events:1",
                "scan:events:2"
            ]
        );
    }

    #[tokio::test]
    async fn discovery_failure_aborts_before_scanning() {
        let client = orders_client().failing_list();
        let mut found: Vec<MatchResult> = Vec::new();

        let req = request("", "", FilterScope::All);
        let err = scan_tables(&client, &req, &mut found).await.unwrap_err();

        assert!(matches!(err, DynoscanError::Discovery(_)));
        assert!(found.is_empty());
        assert!(client.table_reads().is_empty());
    }

    #[tokio::test]
    async fn scan_failure_keeps_earlier_matches_and_skips_later_tables() {
        let client = MockTableClient::new()
            .with_tables(&["t1", "t2", "t3"])
            .with_table_data("t1", &["pk"], vec![vec![item(&[("pk", "hit-1")])]])
            .with_table_data("t2", &["pk"], vec![vec![item(&[("pk", "hit-2")])]])
            .with_table_data("t3", &["pk"], vec![vec![item(&[("pk", "hit-3")])]])
            .failing_scan("t2");
        let mut found: Vec<MatchResult> = Vec::new();

        let req = request("", "hit", FilterScope::KeysOnly);
        let err = scan_tables(&client, &req, &mut found).await.unwrap_err();

        assert!(matches!(err, DynoscanError::Scan { ref table, .. } if table == "t2"));
        assert_eq!(tables_of(&found), vec!["t1"]);
        assert!(!client.table_reads().iter().any(|c| c.contains("t3")));
    }

    #[tokio::test]
    async fn global_tables_can_be_left_out() {
        let client = MockTableClient::new()
            .with_tables(&["local"])
            .with_global_tables(&["replicated"]);
        let mut found: Vec<MatchResult> = Vec::new();

        let req = request("", "", FilterScope::TableNamesOnly).include_global(false);
        scan_tables(&client, &req, &mut found).await.unwrap();

        assert_eq!(tables_of(&found), vec!["local"]);
        assert!(!client.calls().contains(&"list_global_tables".to_string()));
    }
}
