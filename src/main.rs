use clap::Parser;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use dynoscan::cli::Cli;
use dynoscan::dispatch::dispatch;
use dynoscan::output::{Renderer, write_failure};
use dynoscan::{DynamoTableClient, Result};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_filter());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "run failed");
            // stderr is gone if this fails; the exit status still reports the error.
            let _ = write_failure(&mut std::io::stderr(), &e);
            e.exit_code()
        }
    }
}

/// Logs go to stderr so stdout only carries results. RUST_LOG wins over -v.
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.into_config()?;
    let client = DynamoTableClient::connect(&config.aws).await?;

    let mut renderer = Renderer::new(std::io::stdout(), config.output);
    dispatch(&client, &config.mode, &mut renderer).await?;
    Ok(())
}
