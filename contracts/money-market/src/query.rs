use cosmwasm_std::{to_json_binary, Binary, Deps, Env, StdResult, Uint128};

use crate::msg::MarketStateResponse;
use crate::state::{CONFIG, MARKET_STATE, POSITIONS};

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_market_state(deps: Deps, env: Env) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let state = MARKET_STATE.load(deps.storage)?;
    let supply_index = state.index_at(config.supply_rate_mantissa, env.block.height)?;
    let held = deps
        .querier
        .query_balance(&env.contract.address, &config.denom)?
        .amount;
    to_json_binary(&MarketStateResponse {
        supply_index,
        last_accrual_height: state.last_accrual_height,
        total_supplied: state.total_supplied,
        reserves: held.saturating_sub(state.total_supplied),
    })
}

pub fn query_balance_of(deps: Deps, env: Env, address: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    let config = CONFIG.load(deps.storage)?;
    let state = MARKET_STATE.load(deps.storage)?;
    let index_now = state.index_at(config.supply_rate_mantissa, env.block.height)?;
    let balance = match POSITIONS.may_load(deps.storage, &addr)? {
        Some(position) => position.balance_at(index_now)?,
        None => Uint128::zero(),
    };
    to_json_binary(&balance)
}

pub fn query_supply_rate_mantissa(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config.supply_rate_mantissa)
}
