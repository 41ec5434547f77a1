#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the outbreak feed sync tool.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use flu_finder_ingest::{CDC_FEED_URL, inspect_snapshot, sync_feed};
use flu_finder_store::paths;

#[derive(Parser)]
#[command(name = "flu_finder_ingest", about = "Outbreak feed sync tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the upstream feed and replace the local snapshot
    Sync {
        /// Feed URL
        #[arg(long, env = "FLU_FINDER_FEED_URL", default_value = CDC_FEED_URL)]
        url: String,
        /// Snapshot path. Defaults to `<data dir>/outbreaks.csv`.
        #[arg(long, env = "FLU_FINDER_SNAPSHOT")]
        output: Option<PathBuf>,
    },
    /// Print record count, flock size total and date range of a snapshot
    Inspect {
        /// Snapshot path. Defaults to `<data dir>/outbreaks.csv`.
        #[arg(long, env = "FLU_FINDER_SNAPSHOT")]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::Sync { url, output } => {
            let output = output.unwrap_or_else(paths::snapshot_path);
            let start = Instant::now();
            let stats = sync_feed(&url, &output).await?;
            log::info!(
                "Sync complete in {:.1}s: {stats}",
                start.elapsed().as_secs_f64()
            );
        }
        Commands::Inspect { path } => {
            let path = path.unwrap_or_else(paths::snapshot_path);
            let stats = inspect_snapshot(&path).await?;
            println!("{}", path.display());
            println!("  records:     {}", stats.records);
            println!("  undated:     {}", stats.undated);
            println!("  flock size:  {}", stats.flock_size);
            match stats.date_range {
                Some((first, last)) => println!("  date range:  {first} to {last}"),
                None => println!("  date range:  none"),
            }
        }
    }

    Ok(())
}
