//! Bulk-loads a pipe-delimited listing export into the configured database.
//!
//! ```text
//! carvalue-import <BATCH_SIZE> <FILE> [START_FROM]
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use carvalue_core::import::ListingImportService;
use carvalue_server::{config::Config, init_tracing, open_database};
use carvalue_storage_sqlite::ListingRepository;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "carvalue-import")]
#[command(about = "Import historical vehicle listings from a pipe-delimited export")]
struct Cli {
    /// Number of listings committed per transaction
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    batch_size: u64,

    /// Export file; the first line is a header and is skipped
    file: PathBuf,

    /// Number of data lines to skip before importing (resume point)
    #[arg(default_value_t = 0)]
    start_from: usize,

    /// Database file, overriding CV_DB_PATH
    #[arg(long)]
    db_path: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let db_path = cli.db_path.unwrap_or(config.db_path);
    let (pool, writer) = open_database(&db_path)?;
    let repository = Arc::new(ListingRepository::new(pool, writer));
    let batch_size = usize::try_from(cli.batch_size).context("Batch size too large")?;
    let service = ListingImportService::new(repository, batch_size)?;

    let file = File::open(&cli.file)
        .with_context(|| format!("Cannot open export file {}", cli.file.display()))?;
    tracing::info!(
        "Importing {} in batches of {}, skipping {} lines",
        cli.file.display(),
        batch_size,
        cli.start_from
    );

    let summary = service.import(BufReader::new(file), cli.start_from).await?;
    tracing::info!(
        imported = summary.records_imported,
        committed_batches = summary.batches_committed,
        failed_batches = summary.batches_failed,
        skipped_lines = summary.records_skipped,
        "Import complete"
    );
    Ok(())
}
