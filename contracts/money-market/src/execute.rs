use cosmwasm_std::{
    coins, Addr, BankMsg, DepsMut, Env, Event, MessageInfo, Response, Storage, Uint128,
};

use crate::error::ContractError;
use crate::state::{MarketConfig, MarketState, Position, CONFIG, MARKET_STATE, POSITIONS};

/// Validate attached funds: exactly one non-zero coin of the market denom.
fn must_pay(info: &MessageInfo, denom: &str) -> Result<Uint128, ContractError> {
    if info.funds.is_empty() {
        return Err(ContractError::NoFundsSent);
    }
    if info.funds.len() != 1 {
        return Err(ContractError::InvalidFunds);
    }
    let sent = &info.funds[0];
    if sent.denom != denom {
        return Err(ContractError::WrongDenom {
            expected: denom.to_string(),
            denom: sent.denom.clone(),
        });
    }
    if sent.amount.is_zero() {
        return Err(ContractError::NoFundsSent);
    }
    Ok(sent.amount)
}

/// Bring the supply index up to the current block and persist it.
fn accrue(
    storage: &mut dyn Storage,
    config: &MarketConfig,
    height: u64,
) -> Result<MarketState, ContractError> {
    let mut state = MARKET_STATE.load(storage)?;
    state.supply_index = state.index_at(config.supply_rate_mantissa, height)?;
    state.last_accrual_height = height;
    MARKET_STATE.save(storage, &state)?;
    Ok(state)
}

fn current_balance(
    storage: &dyn Storage,
    state: &MarketState,
    addr: &Addr,
) -> Result<Uint128, ContractError> {
    match POSITIONS.may_load(storage, addr)? {
        Some(position) => Ok(position.balance_at(state.supply_index)?),
        None => Ok(Uint128::zero()),
    }
}

pub fn supply(deps: DepsMut, env: Env, info: MessageInfo) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let amount = must_pay(&info, &config.denom)?;
    let mut state = accrue(deps.storage, &config, env.block.height)?;

    let previous = current_balance(deps.storage, &state, &info.sender)?;
    let balance = previous.checked_add(amount)?;
    POSITIONS.save(
        deps.storage,
        &info.sender,
        &Position {
            balance,
            index: state.supply_index,
        },
    )?;

    state.total_supplied = state
        .total_supplied
        .saturating_sub(previous)
        .checked_add(balance)?;
    MARKET_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "supply")
        .add_attribute("supplier", info.sender.to_string())
        .add_attribute("amount", amount.to_string())
        .add_event(
            Event::new("market_supply")
                .add_attribute("supplier", info.sender.to_string())
                .add_attribute("amount", amount.to_string())
                .add_attribute("balance", balance.to_string())
                .add_attribute("supply_index", state.supply_index.to_string()),
        ))
}

pub fn redeem(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    amount: Uint128,
    recipient: Option<String>,
) -> Result<Response, ContractError> {
    if amount.is_zero() {
        return Err(ContractError::ZeroRedeem);
    }

    let config = CONFIG.load(deps.storage)?;
    let recipient = match recipient {
        Some(r) => deps.api.addr_validate(&r)?,
        None => info.sender.clone(),
    };
    let mut state = accrue(deps.storage, &config, env.block.height)?;

    let available = current_balance(deps.storage, &state, &info.sender)?;
    if amount > available {
        return Err(ContractError::InsufficientBalance {
            requested: amount,
            available,
        });
    }
    let remaining = available - amount;
    if remaining.is_zero() {
        POSITIONS.remove(deps.storage, &info.sender);
    } else {
        POSITIONS.save(
            deps.storage,
            &info.sender,
            &Position {
                balance: remaining,
                index: state.supply_index,
            },
        )?;
    }

    // Interest paid beyond recorded principal is drawn from the running total first.
    state.total_supplied = state
        .total_supplied
        .saturating_sub(available)
        .saturating_add(remaining);
    MARKET_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_message(BankMsg::Send {
            to_address: recipient.to_string(),
            amount: coins(amount.u128(), &config.denom),
        })
        .add_attribute("action", "redeem")
        .add_attribute("supplier", info.sender.to_string())
        .add_attribute("recipient", recipient.to_string())
        .add_attribute("amount", amount.to_string())
        .add_event(
            Event::new("market_redeem")
                .add_attribute("supplier", info.sender.to_string())
                .add_attribute("recipient", recipient.to_string())
                .add_attribute("amount", amount.to_string())
                .add_attribute("remaining", remaining.to_string()),
        ))
}

/// Plain top-up of the market's bank balance. Nothing is owed back to the funder.
pub fn fund_reserves(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let amount = must_pay(&info, &config.denom)?;

    Ok(Response::new()
        .add_attribute("action", "fund_reserves")
        .add_attribute("funder", info.sender.to_string())
        .add_attribute("amount", amount.to_string()))
}

pub fn set_supply_rate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    supply_rate_mantissa: Uint128,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can set the supply rate".to_string(),
        });
    }

    accrue(deps.storage, &config, env.block.height)?;

    let old_rate = config.supply_rate_mantissa;
    config.supply_rate_mantissa = supply_rate_mantissa;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "set_supply_rate")
        .add_attribute("old_rate", old_rate.to_string())
        .add_attribute("new_rate", supply_rate_mantissa.to_string()))
}

pub fn update_config(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    admin: Option<String>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update config".to_string(),
        });
    }

    if let Some(a) = admin {
        config.admin = deps.api.addr_validate(&a)?;
    }
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_config")
        .add_attribute("admin", config.admin.to_string()))
}
