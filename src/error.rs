use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum RuleError {
    #[error("Invalid shipment: {0}")]
    #[diagnostic(code(loyalship::invalid_shipment))]
    InvalidShipment(String),
    #[error("Invalid transaction: {0}")]
    #[diagnostic(
        code(loyalship::invalid_transaction),
        help("every transaction needs a date (YYYY-MM-DD) and an amount")
    )]
    InvalidTransaction(String),
    #[error("Invalid analysis: {0}")]
    #[diagnostic(code(loyalship::invalid_analysis))]
    InvalidAnalysis(String),
    #[error("Loyalty analysis {0} not found")]
    #[diagnostic(code(loyalship::analysis_not_found))]
    AnalysisNotFound(u64),
    #[error("Shipment {0} not found")]
    #[diagnostic(code(loyalship::shipment_not_found))]
    ShipmentNotFound(u64),
    #[error("Configuration error: {0}")]
    #[diagnostic(code(loyalship::config))]
    Config(String),
    #[error("CSV error: {0}")]
    #[diagnostic(code(loyalship::csv))]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    #[diagnostic(code(loyalship::io))]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    #[diagnostic(code(loyalship::serialization))]
    SerializationError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    #[diagnostic(code(loyalship::storage))]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    #[diagnostic(code(loyalship::internal))]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, RuleError>;
