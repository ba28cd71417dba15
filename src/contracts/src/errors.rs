use alloy::hex::FromHexError;
use alloy::primitives::ruint::ParseError;
use alloy::transports::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractsError {
    #[error("Failed to parse the RPC URL: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Failed to parse the contract address: {0}")]
    AddressParseError(#[from] FromHexError),

    #[error("Parse contract type error: {0}")]
    ParseContractTypeError(#[from] ParseError),

    #[error("Failed to load signer: {0}")]
    SignerError(String),

    #[error("Ledger transport error: {0}")]
    TransportError(String),

    #[error("Contract call reverted: {0}")]
    Reverted(String),

    #[error("Failed to decode contract data: {0}")]
    DecodeError(#[from] alloy::sol_types::Error),

    #[error("Unknown init data schema: {0}")]
    UnknownSchema(String),

    #[error("Init data field `{0}` is missing")]
    MissingInitField(String),

    #[error("Init data field `{field}` is invalid: {reason}")]
    InvalidInitField { field: String, reason: String },

    #[error("Init data does not match schema {schema}: {reason}")]
    InitDataMismatch { schema: String, reason: String },
}

impl From<TransportError> for ContractsError {
    fn from(err: TransportError) -> Self {
        if let Some(payload) = err.as_error_resp() {
            if payload.message.to_lowercase().contains("revert") {
                return ContractsError::Reverted(payload.message.to_string());
            }
        }
        ContractsError::TransportError(err.to_string())
    }
}

impl ContractsError {
    pub fn is_revert(&self) -> bool {
        matches!(self, ContractsError::Reverted(_))
    }
}
