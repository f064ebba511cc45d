use cosmwasm_std::{to_json_binary, Binary, Deps, Env, Order, StdError, StdResult, Uint128};
use cw_storage_plus::Bound;
use prize_pool_common::entropy::decode_hash32;
use prize_pool_common::fixed_point::{estimated_interest_rate, max_pool_size, split_interest};
use prize_pool_common::{DrawStatus, FixedPointError};

use crate::money_market::MoneyMarket;
use crate::msg::{
    DrawHistoryResponse, PoolStateResponse, UserBalanceResponse, UserWinsResponse,
    WinningsResponse,
};
use crate::selection::calculate_winner;
use crate::state::{
    UserBalance, BALANCES, CONFIG, DRAWS, POOL_STATE, USER_TOTAL_WON, USER_WINS, USER_WIN_COUNT,
};

fn fixed_point_err(err: FixedPointError) -> StdError {
    StdError::generic_err(err.to_string())
}

fn user_balance(deps: Deps, address: &str) -> StdResult<UserBalance> {
    let addr = deps.api.addr_validate(address)?;
    let state = POOL_STATE.load(deps.storage)?;
    Ok(BALANCES
        .may_load(deps.storage, &addr)?
        .unwrap_or_default()
        .normalized(state.current_draw_id))
}

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_pool_state(deps: Deps) -> StdResult<Binary> {
    let state = POOL_STATE.load(deps.storage)?;
    to_json_binary(&PoolStateResponse {
        current_draw_id: state.current_draw_id,
        eligible_supply: state.eligible_supply,
        pending_supply: state.pending_supply,
        sponsorship_supply: state.sponsorship_supply,
        total_supply: state.total_supply()?,
        depositor_count: state.depositor_count,
        draws_rewarded: state.draws_rewarded,
        total_winnings_paid: state.total_winnings_paid,
        total_fees_collected: state.total_fees_collected,
    })
}

pub fn query_draw(deps: Deps, draw_id: u64) -> StdResult<Binary> {
    let draw = DRAWS.load(deps.storage, draw_id)?;
    to_json_binary(&draw)
}

pub fn query_draw_history(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let draws: Vec<_> = DRAWS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(_, draw)| draw)
        .collect();

    to_json_binary(&DrawHistoryResponse { draws })
}

/// `None` while the current draw is committed.
pub fn query_current_open_draw_id(deps: Deps) -> StdResult<Binary> {
    let state = POOL_STATE.load(deps.storage)?;
    let draw = DRAWS.load(deps.storage, state.current_draw_id)?;
    let open = (draw.status == DrawStatus::Open).then_some(draw.id);
    to_json_binary(&open)
}

pub fn query_balance_of(deps: Deps, address: String) -> StdResult<Binary> {
    let balance = user_balance(deps, &address)?;
    to_json_binary(&balance.eligible.checked_add(balance.pending)?)
}

pub fn query_user_balance(deps: Deps, address: String) -> StdResult<Binary> {
    let balance = user_balance(deps, &address)?;
    to_json_binary(&UserBalanceResponse {
        address,
        eligible: balance.eligible,
        pending: balance.pending,
        sponsorship: balance.sponsorship,
    })
}

pub fn query_balance_of_sponsorship(deps: Deps, address: String) -> StdResult<Binary> {
    let balance = user_balance(deps, &address)?;
    to_json_binary(&balance.sponsorship)
}

pub fn query_winnings(deps: Deps, env: Env) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let state = POOL_STATE.load(deps.storage)?;
    let draw = DRAWS.load(deps.storage, state.current_draw_id)?;

    let market_balance = MoneyMarket::new(&config.money_market)
        .balance_of(&deps.querier, &env.contract.address)?;
    let accrued_interest = market_balance.saturating_sub(state.total_supply()?);
    let (winnings, fee) =
        split_interest(accrued_interest, draw.fee_fraction).map_err(fixed_point_err)?;

    to_json_binary(&WinningsResponse {
        draw_id: draw.id,
        accrued_interest,
        winnings,
        fee,
    })
}

pub fn query_user_wins(
    deps: Deps,
    address: String,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    let limit = limit.unwrap_or(100).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let draw_ids: Vec<u64> = USER_WINS
        .prefix(&addr)
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(draw_id, _)| draw_id)
        .collect();

    let total_wins = USER_WIN_COUNT.may_load(deps.storage, &addr)?.unwrap_or(0);
    let total_won = USER_TOTAL_WON
        .may_load(deps.storage, &addr)?
        .unwrap_or(Uint128::zero());

    to_json_binary(&UserWinsResponse {
        address,
        total_wins,
        total_won_amount: total_won,
        draw_ids,
    })
}

pub fn query_calculate_winner(deps: Deps, entropy: String) -> StdResult<Binary> {
    let entropy = decode_hash32(&entropy)
        .ok_or_else(|| StdError::generic_err("entropy must be 32 hex-encoded bytes"))?;
    let state = POOL_STATE.load(deps.storage)?;
    let winner = calculate_winner(
        deps.storage,
        state.current_draw_id,
        state.eligible_supply,
        &entropy,
    )?;
    to_json_binary(&winner)
}

pub fn query_max_pool_size(deps: Deps, blocks: u64) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let rate = MoneyMarket::new(&config.money_market).supply_rate_mantissa(&deps.querier)?;
    let max = max_pool_size(blocks, rate).map_err(fixed_point_err)?;
    to_json_binary(&max.raw())
}

pub fn query_supply_rate_mantissa(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let rate = MoneyMarket::new(&config.money_market).supply_rate_mantissa(&deps.querier)?;
    to_json_binary(&rate)
}

pub fn query_estimated_interest_rate(deps: Deps, blocks: u64) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let rate = MoneyMarket::new(&config.money_market).supply_rate_mantissa(&deps.querier)?;
    let estimate = estimated_interest_rate(blocks, rate).map_err(fixed_point_err)?;
    to_json_binary(&estimate)
}
