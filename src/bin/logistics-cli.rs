use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use chain_logistics::config::{load_config, AppConfig};
use chain_logistics::ledger::{HttpLedgerClient, LedgerClient};
use chain_logistics::observability::logging;
use chain_logistics::verify::{verification_url, VerificationResolver};

#[derive(Parser)]
#[command(name = "logistics-cli")]
#[command(about = "Management CLI for the supply-chain traceability core", long_about = None)]
struct Cli {
    /// Path to a TOML config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a product's ledger view
    Verify { product_id: String },
    /// Print the public verification link for a product
    Link { product_id: String },
    /// Query a transaction's ledger status
    Status { tx_id: String },
    /// Check ledger gateway connectivity
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Verify { product_id } => {
            let ledger = Arc::new(HttpLedgerClient::new(&config.ledger)?);
            let resolver = VerificationResolver::new(ledger);
            let view = resolver.resolve(&product_id).await?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Commands::Link { product_id } => {
            let url = verification_url(&config.verification.base_url, &product_id)?;
            println!("{url}");
        }
        Commands::Status { tx_id } => {
            let ledger = HttpLedgerClient::new(&config.ledger)?;
            let status = ledger.transaction_status(&tx_id).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::Health => {
            let ledger = HttpLedgerClient::new(&config.ledger)?;
            if ledger.is_healthy().await {
                println!("ledger gateway: healthy");
            } else {
                eprintln!("ledger gateway: unreachable");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
