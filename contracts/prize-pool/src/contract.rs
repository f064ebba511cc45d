use cosmwasm_std::{entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult, Uint128};
use cw2::{get_contract_version, set_contract_version};

use crate::error::ContractError;
use crate::execute;
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg, UpdateConfigParams};
use crate::query;
use crate::state::{Draw, PoolConfig, PoolState, CONFIG, DRAWS, POOL_STATE};

const CONTRACT_NAME: &str = "crates.io:prize-pool";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    if CONFIG.exists(deps.storage) {
        return Err(ContractError::AlreadyInitialized);
    }
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    execute::validate_signer_pubkey(&msg.signer_pubkey)?;

    let fee_beneficiary = match msg.fee_beneficiary {
        Some(addr) => deps.api.addr_validate(&addr)?,
        None => info.sender.clone(),
    };

    let config = PoolConfig {
        admin: info.sender.clone(),
        money_market: deps.api.addr_validate(&msg.money_market)?,
        denom: msg.denom,
        fee_fraction: execute::validate_fee_fraction(msg.fee_fraction)?,
        fee_beneficiary,
        block_hash_oracle: deps.api.addr_validate(&msg.block_hash_oracle)?,
        signer_pubkey: msg.signer_pubkey,
        lock_duration_blocks: execute::validate_duration(
            msg.lock_duration_blocks,
            "lock_duration_blocks",
        )?,
        reveal_window_blocks: execute::validate_duration(
            msg.reveal_window_blocks,
            "reveal_window_blocks",
        )?,
    };
    CONFIG.save(deps.storage, &config)?;

    let first_draw = Draw::open(1, Uint128::zero(), config.fee_fraction, env.block.height);
    DRAWS.save(deps.storage, first_draw.id, &first_draw)?;

    POOL_STATE.save(
        deps.storage,
        &PoolState {
            current_draw_id: first_draw.id,
            eligible_supply: Uint128::zero(),
            pending_supply: Uint128::zero(),
            sponsorship_supply: Uint128::zero(),
            depositor_count: 0,
            next_depositor_index: 0,
            draws_rewarded: 0,
            total_winnings_paid: Uint128::zero(),
            total_fees_collected: Uint128::zero(),
        },
    )?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "prize-pool")
        .add_attribute("admin", info.sender.to_string())
        .add_attribute("money_market", config.money_market.to_string())
        .add_event(execute::opened_event(&first_draw)))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::DepositPool {} => execute::deposit_pool(deps, env, info),
        ExecuteMsg::DepositSponsorship {} => execute::deposit_sponsorship(deps, env, info),
        ExecuteMsg::WithdrawPool {} => execute::withdraw_pool(deps, env, info),
        ExecuteMsg::WithdrawPending {} => execute::withdraw_pending(deps, env, info),
        ExecuteMsg::WithdrawSponsorship { amount } => {
            execute::withdraw_sponsorship(deps, env, info, amount)
        }
        ExecuteMsg::Commit { secret_hash } => execute::commit(deps, env, info, secret_hash),
        ExecuteMsg::RewardAndCommit {
            commit_block_hash,
            secret,
            signature,
        } => execute::reward_and_commit(deps, env, info, commit_block_hash, secret, signature),
        ExecuteMsg::CancelDraw {} => execute::cancel_draw(deps, env, info),
        ExecuteMsg::SetFeeFraction { fee_fraction } => {
            execute::set_fee_fraction(deps, env, info, fee_fraction)
        }
        ExecuteMsg::UpdateConfig {
            admin,
            fee_beneficiary,
            signer_pubkey,
            lock_duration_blocks,
            reveal_window_blocks,
        } => execute::update_config(
            deps,
            env,
            info,
            UpdateConfigParams {
                admin,
                fee_beneficiary,
                signer_pubkey,
                lock_duration_blocks,
                reveal_window_blocks,
            },
        ),
    }
}

#[entry_point]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::PoolState {} => query::query_pool_state(deps),
        QueryMsg::Draw { draw_id } => query::query_draw(deps, draw_id),
        QueryMsg::DrawHistory { start_after, limit } => {
            query::query_draw_history(deps, start_after, limit)
        }
        QueryMsg::CurrentOpenDrawId {} => query::query_current_open_draw_id(deps),
        QueryMsg::BalanceOf { address } => query::query_balance_of(deps, address),
        QueryMsg::UserBalance { address } => query::query_user_balance(deps, address),
        QueryMsg::BalanceOfSponsorship { address } => {
            query::query_balance_of_sponsorship(deps, address)
        }
        QueryMsg::Winnings {} => query::query_winnings(deps, env),
        QueryMsg::UserWins {
            address,
            start_after,
            limit,
        } => query::query_user_wins(deps, address, start_after, limit),
        QueryMsg::CalculateWinner { entropy } => query::query_calculate_winner(deps, entropy),
        QueryMsg::MaxPoolSizeFixedPoint24 { blocks } => query::query_max_pool_size(deps, blocks),
        QueryMsg::SupplyRateMantissa {} => query::query_supply_rate_mantissa(deps),
        QueryMsg::EstimatedInterestRate { blocks } => {
            query::query_estimated_interest_rate(deps, blocks)
        }
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
