use cosmwasm_std::{Decimal, OverflowError, StdError, Uint128};
use prize_pool_common::FixedPointError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("{0}")]
    FixedPoint(#[from] FixedPointError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("pool is already initialized")]
    AlreadyInitialized,

    #[error("no funds sent")]
    NoFundsSent,

    #[error("must send exactly one coin")]
    InvalidFunds,

    #[error("must send {expected}, got {denom}")]
    WrongDenom { expected: String, denom: String },

    #[error("pool size exceeded: total would be {total}, max is {max}")]
    PoolSizeExceeded { total: Uint128, max: Uint128 },

    #[error("nothing to withdraw")]
    NothingToWithdraw,

    #[error("funds are locked in committed draw {draw_id}")]
    DrawLocked { draw_id: u64 },

    #[error("insufficient sponsorship balance: requested {requested}, available {available}")]
    InsufficientSponsorship {
        requested: Uint128,
        available: Uint128,
    },

    #[error("draw {draw_id} not found")]
    DrawNotFound { draw_id: u64 },

    #[error("draw {draw_id} is not in Open status")]
    DrawNotOpen { draw_id: u64 },

    #[error("draw {draw_id} is not in Committed status")]
    DrawNotCommitted { draw_id: u64 },

    #[error("no eligible supply to draw from")]
    NoEligibleSupply,

    #[error("draw {draw_id} has eligible supply and cannot be cancelled while open")]
    DrawHasEligibleSupply { draw_id: u64 },

    #[error("draw {draw_id} cannot be revealed before block {commit_block} has been produced")]
    RevealTooEarly { draw_id: u64, commit_block: u64 },

    #[error("draw {draw_id} reveal window closed at block {deadline}")]
    RevealWindowClosed { draw_id: u64, deadline: u64 },

    #[error("draw {draw_id} reveal window is still open until block {deadline}")]
    RevealWindowOpen { draw_id: u64, deadline: u64 },

    #[error("commit pre-image mismatch: sha256(secret) != commit")]
    CommitMismatch,

    #[error("block hash for height {height} is unavailable")]
    BlockHashUnavailable { height: u64 },

    #[error("block hash for height {height} does not match the recorded hash")]
    BlockHashMismatch { height: u64 },

    #[error("invalid reveal signature")]
    InvalidSignature,

    #[error("invalid signer public key: expected 33 or 65 bytes, got {got}")]
    InvalidPublicKey { got: usize },

    #[error("invalid hex: {field}")]
    InvalidHex { field: String },

    #[error("fee fraction {fee_fraction} must be between 0 and 1")]
    InvalidFeeFraction { fee_fraction: Decimal },

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: String },

    #[error("no winner found for draw {draw_id}")]
    NoWinner { draw_id: u64 },
}
