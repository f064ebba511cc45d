use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, Timestamp};
use cw_storage_plus::{Item, Map};

pub const CONFIG: Item<OracleConfig> = Item::new("config");
pub const BLOCK_HASHES: Map<u64, StoredBlockHash> = Map::new("block_hashes");
pub const LATEST_HEIGHT: Item<u64> = Item::new("latest_height");

/// Default lookback, mirroring the 256-block horizon of an EVM `blockhash`.
pub const DEFAULT_RETENTION_BLOCKS: u64 = 256;

#[cw_serde]
pub struct OracleConfig {
    pub admin: Addr,
    pub operators: Vec<Addr>,
    /// How many blocks a recorded hash stays available to readers.
    pub retention_blocks: u64,
}

#[cw_serde]
pub struct StoredBlockHash {
    pub height: u64,
    /// 32 raw bytes
    pub hash: Binary,
    pub submitted_at: Timestamp,
    pub submitted_by: Addr,
}

impl StoredBlockHash {
    /// A hash is served only while `height + retention_blocks >= current_height`.
    pub fn is_available(&self, current_height: u64, retention_blocks: u64) -> bool {
        self.height.saturating_add(retention_blocks) >= current_height
    }
}
