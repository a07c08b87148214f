//! Command dispatch: list tables or scan them, decided once per run.

use std::io::Write;
use tracing::info;

use crate::client::TableClient;
use crate::config::Mode;
use crate::errors::Result;
use crate::output::Renderer;
use crate::scanner::{ScanSummary, scan_tables};
use crate::table_operations::list_combined_tables;

/// What a finished run did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Number of tables printed.
    Listed(usize),
    Scanned(ScanSummary),
}

/// Run `mode` against `client`, writing results through `renderer`.
pub async fn dispatch<C, W>(client: &C, mode: &Mode, renderer: &mut Renderer<W>) -> Result<Outcome>
where
    C: TableClient + ?Sized,
    W: Write,
{
    match mode {
        Mode::ListTables { include_global } => {
            let tables = list_combined_tables(client, true, *include_global).await?;
            for table in &tables {
                renderer.write_table(table)?;
            }
            info!(count = tables.len(), "listed tables");
            Ok(Outcome::Listed(tables.len()))
        }
        Mode::Scan(request) => {
            let summary = scan_tables(client, request, renderer).await?;
            Ok(Outcome::Scanned(summary))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FilterScope, OutputFormat, ScanRequest};
    use crate::errors::DynoscanError;
    use crate::testing::{MockTableClient, item};

    fn client() -> MockTableClient {
        MockTableClient::new()
            .with_tables(&["users", "orders"])
            .with_global_tables(&["orders", "sessions"])
            .with_table_data(
                "users",
                &["pk"],
                vec![vec![item(&[("pk", "u1"), ("email", "ada@example.com")])]],
            )
    }

    async fn run(client: &MockTableClient, mode: Mode) -> (Result<Outcome>, String) {
        let mut renderer = Renderer::new(Vec::new(), OutputFormat::Text);
        let outcome = dispatch(client, &mode, &mut renderer).await;
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        (outcome, out)
    }

    #[tokio::test]
    async fn list_mode_prints_merged_names() {
        let client = client();

        let mode = Mode::ListTables {
            include_global: true,
        };
        let (outcome, out) = run(&client, mode).await;

        assert_eq!(outcome.unwrap(), Outcome::Listed(3));
        assert_eq!(out, "orders\nsessions\nusers\n");
        assert!(client.table_reads().is_empty());
    }

    #[tokio::test]
    async fn list_mode_without_global_tables() {
        let client = client();

        let mode = Mode::ListTables {
            include_global: false,
        };
        let (outcome, out) = run(&client, mode).await;

        assert_eq!(outcome.unwrap(), Outcome::Listed(2));
        assert_eq!(out, "orders\nusers\n");
    }

    #[tokio::test]
    async fn scan_mode_streams_matches() {
        let client = client();
        let request = ScanRequest::new("^users$", "example", FilterScope::DataOnly).unwrap();

        let (outcome, out) = run(&client, Mode::Scan(request)).await;

        match outcome.unwrap() {
            Outcome::Scanned(summary) => assert_eq!(summary.matches, 1),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(out, "users\tdata\temail\t{\"pk\":\"u1\"}\tada@example.com\n");
    }

    #[tokio::test]
    async fn list_failure_surfaces_as_discovery_error() {
        let client = client().failing_list();

        let mode = Mode::ListTables {
            include_global: true,
        };
        let (outcome, out) = run(&client, mode).await;

        assert!(matches!(outcome, Err(DynoscanError::Discovery(_))));
        assert!(out.is_empty());
    }
}
