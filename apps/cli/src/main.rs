//! # Stockpile CLI
//!
//! Command-line caller for the cache-first stock repository.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging to stderr)
//! 2. Parse arguments
//! 3. Load configuration (file, then environment)
//! 4. Open the local store and run migrations
//! 5. Build the HTTP transport and the repository
//! 6. Run the command, draining notifications on this task
//!
//! ```bash
//! stockpile list
//! stockpile save "Blue Pen" 175 12
//! RUST_LOG=debug stockpile --config ./stockpile.toml save Pen 150 8 --id 1
//! ```

mod args;
mod commands;

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use stockpile_db::Database;
use stockpile_sync::{notification_channel, HttpTransport, StockRepository, StockpileConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::args::{Command, USAGE};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = match args::parse(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: args::Args) -> commands::CliResult {
    let config = StockpileConfig::load(args.config)?;
    info!(
        remote = %config.remote.base_url,
        workers = config.repository.workers,
        "Configuration loaded"
    );

    let db = Database::new(config.database.to_db_config()?).await?;
    let transport = HttpTransport::new(&config.remote)?;
    let (dispatcher, queue) = notification_channel();

    let repository = StockRepository::new(
        Arc::new(db.products()),
        Arc::new(transport),
        Arc::new(dispatcher),
        config.repository.clone(),
    );

    let outcome = match args.command {
        Command::List => commands::list(&repository, queue).await,
        Command::Save(product) => commands::save(&repository, product, queue).await,
    };

    repository.shutdown();
    db.close().await;
    outcome
}

/// Logs go to stderr so command output stays clean on stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockpile=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
