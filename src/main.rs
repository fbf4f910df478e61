//! pokeload - load the Pokémon stats CSV into a BigQuery table

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use pokeload::config::Config;
use pokeload::error::PokeloadError;
use pokeload::model::pokemon_table_schema;
use pokeload::publish::BigQueryClient;
use pokeload::{loader, transform};

/// One-shot loader: read the Pokémon stats CSV, reshape its columns, and
/// bulk-load it into a fresh BigQuery table.
#[derive(Parser, Debug)]
#[command(name = "pokeload")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the source CSV
    #[arg(long, default_value = "pokemon.csv")]
    csv: PathBuf,

    /// Google Cloud project id (falls back to GOOGLE_CLOUD_PROJECT)
    #[arg(long)]
    project: Option<String>,

    /// Destination dataset id
    #[arg(long, default_value = "poke_battler_data")]
    dataset: String,

    /// Destination table id
    #[arg(long, default_value = "pokemon")]
    table: String,

    /// Dataset location
    #[arg(long, default_value = "US")]
    location: String,

    /// Bound on the dataset-creation call, in seconds
    #[arg(long, default_value_t = 30)]
    dataset_timeout: u64,

    /// Bound on the table load, in seconds
    #[arg(long, default_value_t = 300)]
    load_timeout: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), PokeloadError> {
    let cli = Cli::parse();
    let config = Config::from_env(
        cli.csv,
        cli.project,
        cli.dataset,
        cli.table,
        cli.location,
        cli.dataset_timeout,
        cli.load_timeout,
    )?;

    let mut records = loader::import(&config.csv_path)?;
    info!(
        rows = records.row_count(),
        columns = records.column_count(),
        csv = %config.csv_path.display(),
        "imported record set"
    );

    transform::transform(&mut records)?;

    let client = BigQueryClient::new(config);
    client.ensure_dataset().await?;
    client
        .publish_table(&records, &pokemon_table_schema())
        .await?;

    Ok(())
}
