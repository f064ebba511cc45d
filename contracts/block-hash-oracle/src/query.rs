use cosmwasm_std::{to_json_binary, Binary, Deps, Env, StdResult};

use crate::msg::BlockHashResponse;
use crate::state::{BLOCK_HASHES, CONFIG, LATEST_HEIGHT};

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_block_hash(deps: Deps, env: Env, height: u64) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let response = BLOCK_HASHES
        .may_load(deps.storage, height)?
        .filter(|stored| stored.is_available(env.block.height, config.retention_blocks))
        .map(|stored| BlockHashResponse {
            height: stored.height,
            hash: stored.hash,
        });
    to_json_binary(&response)
}

pub fn query_latest_height(deps: Deps) -> StdResult<Binary> {
    let height = LATEST_HEIGHT.may_load(deps.storage)?.unwrap_or(0);
    to_json_binary(&height)
}
