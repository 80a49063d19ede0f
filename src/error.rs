use crate::domain::team::PaymentStatus;
use thiserror::Error;

/// Failures talking to the external payment gateway.
///
/// A gateway error always means "status unknown": callers must never treat
/// it as a failed payment or mutate team state because of it.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("gateway transport error: {0}")]
    Transport(String),
    #[error("gateway request timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },
    #[error("gateway returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("malformed gateway payload: {0}")]
    Malformed(String),
    #[error("gateway rejected the request: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("transaction {trx_id} does not belong to team {team_id}")]
    TrxMismatch { team_id: String, trx_id: String },
    #[error("validation error: {0}")]
    ValidationError(String),
    #[error("team {0} not found")]
    TeamNotFound(String),
    #[error("team {team_id} already holds transaction {trx_id}")]
    TransactionAlreadyAssigned { team_id: String, trx_id: String },
    #[error("team {team_id} cannot move from {from} to {to}")]
    InvalidTransition {
        team_id: String,
        from: PaymentStatus,
        to: PaymentStatus,
    },
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
    #[error("internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, PaymentError>;
