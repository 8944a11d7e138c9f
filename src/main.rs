use clap::{Parser, Subcommand};
use loyalship::application::engine::RuleEngine;
use loyalship::config::AppConfig;
use loyalship::domain::ports::{AnalysisStoreBox, SequenceBox, ShipmentStoreBox};
use loyalship::infrastructure::in_memory::{
    InMemoryAnalysisStore, InMemorySequence, InMemoryShipmentStore,
};
use loyalship::interfaces::csv::report_writer::ReportWriter;
use loyalship::interfaces::csv::shipment_reader::ShipmentReader;
use loyalship::interfaces::csv::transaction_reader::TransactionReader;
use loyalship::telemetry;
use miette::{IntoDiagnostic, Result, miette};
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file overriding loyalty rules, shipment rates or log level
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter (overrides the config file; RUST_LOG still wins)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify and score a customer's transactions CSV (date, amount, status)
    Loyalty {
        input: PathBuf,
        /// Customer name recorded on the analysis
        #[arg(long, default_value = "customer")]
        name: String,
    },
    /// Cost a shipments CSV (category, distance_km, identifier)
    Shipments {
        input: PathBuf,
        /// Identifier of the fragile shipment to include in the grand total
        #[arg(long)]
        fragile: Option<String>,
        /// Identifier of the priority shipment to include in the grand total
        #[arg(long)]
        priority: Option<String>,
    },
}

fn build_engine(db_path: Option<PathBuf>) -> Result<RuleEngine> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(db_path) = db_path {
        use loyalship::infrastructure::rocksdb::RocksDBStore;

        let store = RocksDBStore::open(db_path)?;
        let analyses: AnalysisStoreBox = Box::new(store.clone());
        let shipments: ShipmentStoreBox = Box::new(store.clone());
        let sequence: SequenceBox = Box::new(store);
        return Ok(RuleEngine::new(analyses, shipments, sequence));
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }

    let analyses: AnalysisStoreBox = Box::new(InMemoryAnalysisStore::new());
    let shipments: ShipmentStoreBox = Box::new(InMemoryShipmentStore::new());
    let sequence: SequenceBox = Box::new(InMemorySequence::new());
    Ok(RuleEngine::new(analyses, shipments, sequence))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.telemetry.log_level = level;
    }
    telemetry::init(&config.telemetry).into_diagnostic()?;

    let engine = build_engine(cli.db_path)?.with_rules(config.loyalty, config.shipment)?;

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());

    match cli.command {
        Command::Loyalty { input, name } => {
            let analysis = engine.create_analysis(&name).await?;

            let file = File::open(input).into_diagnostic()?;
            let reader = TransactionReader::new(file);
            for tx_result in reader.transactions() {
                match tx_result {
                    Ok(tx) => engine.add_transaction(analysis.id, tx).await?,
                    Err(e) => tracing::warn!(error = %e, "Error reading transaction"),
                }
            }

            let analysis = engine.run_loyalty(analysis.id).await?;
            writer.write_transactions(&analysis)?;
            writer.write_analysis(&analysis)?;
        }
        Command::Shipments {
            input,
            fragile,
            priority,
        } => {
            let file = File::open(input).into_diagnostic()?;
            let reader = ShipmentReader::new(file);
            let mut created = Vec::new();
            for request_result in reader.shipments() {
                let created_result = match request_result {
                    Ok(request) => {
                        engine
                            .create_shipment(
                                request.category,
                                request.distance_km,
                                request.identifier,
                            )
                            .await
                    }
                    Err(e) => Err(e),
                };
                match created_result {
                    Ok(shipment) => created.push(shipment),
                    Err(e) => tracing::warn!(error = %e, "Error reading shipment"),
                }
            }

            let find = |identifier: Option<String>| -> Result<Option<u64>> {
                match identifier {
                    Some(identifier) => created
                        .iter()
                        .find(|s| s.identifier.as_deref() == Some(identifier.as_str()))
                        .map(|s| Some(s.id))
                        .ok_or_else(|| miette!("no shipment with identifier {identifier}")),
                    None => Ok(None),
                }
            };
            let fragile_id = find(fragile)?;
            let priority_id = find(priority)?;

            let totals = engine.grand_total(fragile_id, priority_id).await?;
            writer.write_shipments(&created)?;
            writer.write_grand_total(&totals)?;
        }
    }

    Ok(())
}
