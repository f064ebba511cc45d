use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Binary;

use crate::state::OracleConfig;

#[cw_serde]
pub struct InstantiateMsg {
    pub operators: Vec<String>,
    /// Defaults to 256 blocks.
    pub retention_blocks: Option<u64>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Record the hash of an already-produced block. Operators only.
    SubmitBlockHash {
        height: u64,
        /// Hex-encoded 32-byte hash
        hash_hex: String,
    },
    /// Update operator list (admin only).
    UpdateOperators {
        add: Vec<String>,
        remove: Vec<String>,
    },
    /// Update the retention window (admin only).
    UpdateConfig { retention_blocks: Option<u64> },
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(OracleConfig)]
    Config {},

    /// `None` when the hash was never recorded or has aged out of the window.
    #[returns(Option<BlockHashResponse>)]
    BlockHash { height: u64 },

    #[returns(u64)]
    LatestHeight {},
}

#[cw_serde]
pub struct BlockHashResponse {
    pub height: u64,
    pub hash: Binary,
}
