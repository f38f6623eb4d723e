use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use datawash::app::CleaningService;
use datawash::config::Config;
use datawash::formats::{self, FileFormat};
use datawash::inference;
use datawash::logging::init_logging;
use datawash::pipeline::{self, options::CleaningOptions};
use datawash::server;
use datawash::stats;
use datawash::storage::InMemoryStore;

#[derive(Parser)]
#[command(name = "datawash")]
#[command(about = "Tabular data cleaning engine and service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the bind address
        #[arg(long)]
        bind: Option<String>,
    },
    /// Clean a local file and write the result
    Clean {
        /// Input file (format from extension: csv, xlsx, json)
        #[arg(long)]
        input: PathBuf,
        /// Cleaning options as a JSON document
        #[arg(long)]
        options: Option<PathBuf>,
        /// Additional files merged into the input before cleaning
        #[arg(long)]
        merge: Vec<PathBuf>,
        /// Output file (format from extension)
        #[arg(long)]
        output: PathBuf,
    },
    /// Print statistics for a local file
    Stats {
        /// Input file (format from extension)
        #[arg(long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    init_logging();

    match cli.command {
        Commands::Serve { config, bind } => {
            let mut config = Config::load(config.as_deref())?;
            if let Some(bind) = bind {
                config.bind = bind;
            }
            let store = Arc::new(InMemoryStore::new());
            let service = Arc::new(CleaningService::new(store, config.preview_rows));
            server::serve(&config, service).await?;
        }
        Commands::Clean {
            input,
            options,
            merge,
            output,
        } => {
            let options = match options {
                Some(path) => {
                    let content = fs::read_to_string(&path)
                        .with_context(|| format!("failed to read options file {}", path.display()))?;
                    serde_json::from_str::<CleaningOptions>(&content)
                        .with_context(|| format!("failed to parse options file {}", path.display()))?
                }
                None => CleaningOptions::default(),
            };

            let table = load_table(&input)?;
            let merge_tables = merge
                .iter()
                .map(|path| load_table(path))
                .collect::<anyhow::Result<Vec<_>>>()?;

            println!("🧽 cleaning {} ({} rows)", input.display(), table.row_count());
            let outcome = pipeline::clean(table, merge_tables, &options)?;

            for warning in &outcome.warnings {
                println!("⚠️  {}", warning.message());
            }

            let output_format = FileFormat::from_filename(&output.to_string_lossy())?;
            let bytes = formats::export(&outcome.table, output_format)?;
            fs::write(&output, bytes)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!(
                "✅ wrote {} ({} rows, {} warning(s))",
                output.display(),
                outcome.table.row_count(),
                outcome.warnings.len()
            );
        }
        Commands::Stats { input } => {
            let table = load_table(&input)?;
            let statistics = stats::compute(&table);
            println!("{}", serde_json::to_string_pretty(&statistics)?);
        }
    }

    Ok(())
}

fn load_table(path: &PathBuf) -> anyhow::Result<datawash::domain::Table> {
    let format = FileFormat::from_filename(&path.to_string_lossy())?;
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let table = formats::parse(&bytes, format)?;
    Ok(inference::infer(table))
}
