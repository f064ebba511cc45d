use cosmwasm_std::{Binary, DepsMut, Env, Event, MessageInfo, Response};

use crate::error::ContractError;
use crate::state::{StoredBlockHash, BLOCK_HASHES, CONFIG, LATEST_HEIGHT};

/// Record a block hash. Only operators can call this.
/// Heights above the current block are rejected: their hash cannot be known yet.
pub fn submit_block_hash(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    height: u64,
    hash_hex: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    if !config.operators.contains(&info.sender) {
        return Err(ContractError::Unauthorized {
            reason: "only operators can submit block hashes".to_string(),
        });
    }

    if height > env.block.height {
        return Err(ContractError::FutureBlock {
            height,
            current: env.block.height,
        });
    }

    if BLOCK_HASHES.has(deps.storage, height) {
        return Err(ContractError::BlockHashAlreadyExists { height });
    }

    let hash = hex::decode(&hash_hex).map_err(|_| ContractError::InvalidHex {
        field: "hash_hex".to_string(),
    })?;
    if hash.len() != 32 {
        return Err(ContractError::InvalidHashLength { got: hash.len() });
    }

    let stored = StoredBlockHash {
        height,
        hash: Binary::from(hash),
        submitted_at: env.block.time,
        submitted_by: info.sender.clone(),
    };
    BLOCK_HASHES.save(deps.storage, height, &stored)?;

    let current_latest = LATEST_HEIGHT.may_load(deps.storage)?.unwrap_or(0);
    if height > current_latest {
        LATEST_HEIGHT.save(deps.storage, &height)?;
    }

    Ok(Response::new()
        .add_attribute("action", "submit_block_hash")
        .add_attribute("height", height.to_string())
        .add_attribute("submitted_by", info.sender.to_string())
        .add_event(
            Event::new("block_hash_submitted")
                .add_attribute("height", height.to_string())
                .add_attribute("hash", hash_hex.to_lowercase())
                .add_attribute("submitted_by", info.sender.to_string()),
        ))
}

/// Update the operator list. Admin only.
pub fn update_operators(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    add: Vec<String>,
    remove: Vec<String>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;

    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update operators".to_string(),
        });
    }

    for addr_str in &remove {
        let addr = deps.api.addr_validate(addr_str)?;
        config.operators.retain(|a| *a != addr);
    }

    for addr_str in &add {
        let addr = deps.api.addr_validate(addr_str)?;
        if !config.operators.contains(&addr) {
            config.operators.push(addr);
        }
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_operators")
        .add_attribute("added", add.join(","))
        .add_attribute("removed", remove.join(",")))
}

pub fn update_config(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    retention_blocks: Option<u64>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;

    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update config".to_string(),
        });
    }

    if let Some(retention) = retention_blocks {
        if retention == 0 {
            return Err(ContractError::InvalidRetention);
        }
        config.retention_blocks = retention;
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_config")
        .add_attribute("retention_blocks", config.retention_blocks.to_string()))
}
