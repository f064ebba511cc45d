use cosmwasm_std::{
    entry_point, Binary, Decimal, Deps, DepsMut, Env, MessageInfo, Response, StdResult, Uint128,
};
use cw2::{get_contract_version, set_contract_version};

use crate::error::ContractError;
use crate::execute;
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query;
use crate::state::{MarketConfig, MarketState, CONFIG, MARKET_STATE};

const CONTRACT_NAME: &str = "crates.io:prize-pool-money-market";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let config = MarketConfig {
        admin: info.sender.clone(),
        denom: msg.denom.clone(),
        supply_rate_mantissa: msg.supply_rate_mantissa,
    };
    CONFIG.save(deps.storage, &config)?;

    MARKET_STATE.save(
        deps.storage,
        &MarketState {
            supply_index: Decimal::one(),
            last_accrual_height: env.block.height,
            total_supplied: Uint128::zero(),
        },
    )?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "money-market")
        .add_attribute("denom", msg.denom)
        .add_attribute("supply_rate_mantissa", msg.supply_rate_mantissa.to_string())
        .add_attribute("admin", info.sender.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Supply {} => execute::supply(deps, env, info),
        ExecuteMsg::Redeem { amount, recipient } => {
            execute::redeem(deps, env, info, amount, recipient)
        }
        ExecuteMsg::FundReserves {} => execute::fund_reserves(deps, env, info),
        ExecuteMsg::SetSupplyRate {
            supply_rate_mantissa,
        } => execute::set_supply_rate(deps, env, info, supply_rate_mantissa),
        ExecuteMsg::UpdateConfig { admin } => execute::update_config(deps, env, info, admin),
    }
}

#[entry_point]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::MarketState {} => query::query_market_state(deps, env),
        QueryMsg::BalanceOf { address } => query::query_balance_of(deps, env, address),
        QueryMsg::SupplyRateMantissa {} => query::query_supply_rate_mantissa(deps),
    }
}

#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Unauthorized {
            reason: "Cannot migrate from different contract type".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
