use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("block hash for height {height} already exists")]
    BlockHashAlreadyExists { height: u64 },

    #[error("block {height} is in the future (current height {current})")]
    FutureBlock { height: u64, current: u64 },

    #[error("invalid hex input: {field}")]
    InvalidHex { field: String },

    #[error("invalid block hash length: expected 32 bytes, got {got}")]
    InvalidHashLength { got: usize },

    #[error("retention window must be at least one block")]
    InvalidRetention,
}
