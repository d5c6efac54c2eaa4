//! Load medicine records from a JSON file into the directory database.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use med_alt_core::{Database, MedicineRecord};
use tracing_subscriber::EnvFilter;

/// Upsert medicine records into a med-alt SQLite database.
#[derive(Parser, Debug)]
#[command(name = "med-alt-import", version)]
struct Cli {
    /// SQLite database file (created if missing)
    #[arg(long, env = "DB_NAME")]
    database: PathBuf,

    /// JSON file holding an array of medicine records
    records: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let raw = std::fs::read_to_string(&cli.records)
        .with_context(|| format!("reading {}", cli.records.display()))?;
    let records: Vec<MedicineRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", cli.records.display()))?;

    let mut db = Database::open(&cli.database)
        .with_context(|| format!("opening {}", cli.database.display()))?;
    let written = db.upsert_medicines(&records)?;
    let total = db.count_medicines()?;

    tracing::info!(
        written,
        total,
        database = %cli.database.display(),
        "medicine records imported"
    );
    Ok(())
}
