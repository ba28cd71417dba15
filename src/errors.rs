use crate::operation::OperationState;
use alloy::primitives::TxHash;
use api::errors::ApiError;
use contracts::errors::ContractsError;
use std::time::Duration;
use thiserror::Error;

/// Malformed request, caught before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Required field `{0}` is missing")]
    MissingField(String),
    #[error("Failed to encode `{field}`: {reason}")]
    Encoding { field: String, reason: String },
}

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Gas estimation failed: {0}")]
    GasEstimation(String),
    #[error("Gas limit {requested} exceeds the configured ceiling {ceiling}")]
    GasCeilingExceeded { requested: u64, ceiling: u64 },
    #[error("Transaction was rejected: {0}")]
    Rejected(String),
    /// The send was abandoned while in flight; the node may have accepted it.
    #[error("Broadcast outcome unknown, the transaction may have been sent: {0}")]
    BroadcastOutcomeUnknown(String),
    #[error("Transaction {tx_hash} reverted in block {block_number}")]
    Reverted { tx_hash: TxHash, block_number: u64 },
    #[error("Transaction {tx_hash} was not confirmed within {waited:?}")]
    ConfirmationTimeout { tx_hash: TxHash, waited: Duration },
    #[error("Submission cancelled (transaction: {tx_hash:?})")]
    Cancelled { tx_hash: Option<TxHash> },
}

/// Transport-level failure while re-reading state. A mismatch is never a `ReadError`.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Read transport error: {0}")]
    Transport(String),
    #[error("Failed to decode read result: {0}")]
    Decode(String),
    #[error("Read did not complete within {0:?}")]
    Timeout(Duration),
    #[error("Read cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum LensCarbonError {
    #[error("No `{name}` contract registered for network `{network}`")]
    UnknownContract { name: String, network: String },
    #[error("Build error: {0}")]
    Build(#[from] BuildError),
    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),
    #[error("Read error: {0}")]
    Read(#[from] ReadError),
    #[error("Transaction {tx_hash} confirmed, but its effect could not be read back: {source}")]
    Unverified { tx_hash: TxHash, source: ReadError },
    #[error("Contract error: {0}")]
    ContractCallError(#[from] ContractsError),
    #[error("Api call error: {0}")]
    ApiError(#[from] ApiError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Environment variable `{0}` for the signing key is not set")]
    MissingIdentity(String),
    #[error("Operation cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        from: OperationState,
        to: OperationState,
    },
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<ContractsError> for ReadError {
    fn from(err: ContractsError) -> Self {
        match err {
            ContractsError::DecodeError(e) => ReadError::Decode(e.to_string()),
            other => ReadError::Transport(other.to_string()),
        }
    }
}
