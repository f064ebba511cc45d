use cosmwasm_std::{
    Addr, Binary, Coin, Decimal, DepsMut, Env, Event, MessageInfo, QuerierWrapper, Response,
    Storage, Uint128,
};
use prize_pool_common::entropy::decode_hash32;
use prize_pool_common::fixed_point::{max_pool_size_units, split_interest};
use prize_pool_common::{derive_entropy, reduce_entropy, reward_digest, secret_commitment, DrawStatus};

use crate::error::ContractError;
use crate::ledger::{
    credit_eligible, credit_pending, credit_sponsorship, debit_pending, debit_principal,
    debit_sponsorship, load_balance, promote_pending,
};
use crate::money_market::MoneyMarket;
use crate::msg::UpdateConfigParams;
use crate::oracle::query_block_hash;
use crate::selection::winner_for_ticket;
use crate::state::{
    Draw, PoolConfig, PoolState, CONFIG, DRAWS, POOL_STATE, USER_TOTAL_WON, USER_WINS,
    USER_WIN_COUNT,
};

fn ensure_admin(config: &PoolConfig, sender: &Addr, action: &str) -> Result<(), ContractError> {
    if *sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: format!("only admin can {action}"),
        });
    }
    Ok(())
}

pub(crate) fn validate_fee_fraction(fee_fraction: Decimal) -> Result<Decimal, ContractError> {
    if fee_fraction > Decimal::one() {
        return Err(ContractError::InvalidFeeFraction { fee_fraction });
    }
    Ok(fee_fraction)
}

/// Compressed (33) or uncompressed (65) secp256k1 key.
pub(crate) fn validate_signer_pubkey(pubkey: &Binary) -> Result<(), ContractError> {
    match pubkey.len() {
        33 | 65 => Ok(()),
        got => Err(ContractError::InvalidPublicKey { got }),
    }
}

pub(crate) fn validate_duration(blocks: u64, field: &str) -> Result<u64, ContractError> {
    if blocks == 0 {
        return Err(ContractError::ZeroDuration {
            field: field.to_string(),
        });
    }
    Ok(blocks)
}

pub(crate) fn opened_event(draw: &Draw) -> Event {
    Event::new("Opened")
        .add_attribute("draw_id", draw.id.to_string())
        .add_attribute("starting_total", draw.starting_total.to_string())
        .add_attribute("fee_fraction", draw.fee_fraction.to_string())
}

/// Validate funds: exactly one non-zero coin of the pool denom.
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

/// Reject totals that could overflow fixed point once a draw's interest accrues.
/// The market rate is re-read on every check.
fn check_pool_size(
    querier: &QuerierWrapper,
    config: &PoolConfig,
    new_total: Uint128,
) -> Result<(), ContractError> {
    let rate = MoneyMarket::new(&config.money_market).supply_rate_mantissa(querier)?;
    let max = max_pool_size_units(config.lock_duration_blocks, rate)?;
    if new_total > max {
        return Err(ContractError::PoolSizeExceeded {
            total: new_total,
            max,
        });
    }
    Ok(())
}

fn load_current_draw(storage: &dyn Storage, state: &PoolState) -> Result<Draw, ContractError> {
    let draw_id = state.current_draw_id;
    DRAWS
        .may_load(storage, draw_id)?
        .ok_or(ContractError::DrawNotFound { draw_id })
}

/// Promote pending deposits and open the draw after the current one.
fn open_next_draw(
    storage: &mut dyn Storage,
    state: &mut PoolState,
    config: &PoolConfig,
    height: u64,
) -> Result<Event, ContractError> {
    promote_pending(state)?;
    state.current_draw_id += 1;
    let draw = Draw::open(
        state.current_draw_id,
        state.eligible_supply,
        config.fee_fraction,
        height,
    );
    DRAWS.save(storage, draw.id, &draw)?;
    Ok(opened_event(&draw))
}

/// Deposit into the pool. Eligible starting with the next draw.
pub fn deposit_pool(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let amount = must_pay(&info, &config.denom)?;
    let mut state = POOL_STATE.load(deps.storage)?;

    check_pool_size(&deps.querier, &config, state.total_supply()?.checked_add(amount)?)?;

    let balance = credit_pending(deps.storage, &mut state, &info.sender, amount)?;
    POOL_STATE.save(deps.storage, &state)?;

    let supply_msg = MoneyMarket::new(&config.money_market).supply_msg(Coin {
        denom: config.denom.clone(),
        amount,
    })?;

    Ok(Response::new()
        .add_message(supply_msg)
        .add_attribute("action", "deposit_pool")
        .add_attribute("sender", info.sender.to_string())
        .add_attribute("amount", amount.to_string())
        .add_attribute("draw_id", state.current_draw_id.to_string())
        .add_attribute("pending", balance.pending.to_string())
        .add_event(
            Event::new("Deposited")
                .add_attribute("sender", info.sender.to_string())
                .add_attribute("amount", amount.to_string()),
        ))
}

/// Deposit sponsorship: earns yield for the pool, never eligible to win.
pub fn deposit_sponsorship(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let amount = must_pay(&info, &config.denom)?;
    let mut state = POOL_STATE.load(deps.storage)?;

    check_pool_size(&deps.querier, &config, state.total_supply()?.checked_add(amount)?)?;

    credit_sponsorship(deps.storage, &mut state, &info.sender, amount)?;
    POOL_STATE.save(deps.storage, &state)?;

    let supply_msg = MoneyMarket::new(&config.money_market).supply_msg(Coin {
        denom: config.denom.clone(),
        amount,
    })?;

    Ok(Response::new()
        .add_message(supply_msg)
        .add_attribute("action", "deposit_sponsorship")
        .add_attribute("sender", info.sender.to_string())
        .add_attribute("amount", amount.to_string())
        .add_event(
            Event::new("SponsorshipDeposited")
                .add_attribute("sender", info.sender.to_string())
                .add_attribute("amount", amount.to_string()),
        ))
}

/// Withdraw all eligible and pending principal.
/// Locked while a committed draw holds the caller's eligible funds.
pub fn withdraw_pool(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut state = POOL_STATE.load(deps.storage)?;
    let draw = load_current_draw(deps.storage, &state)?;

    let balance = load_balance(deps.storage, &info.sender, state.current_draw_id)?;
    if balance.principal()?.is_zero() {
        return Err(ContractError::NothingToWithdraw);
    }
    if draw.status == DrawStatus::Committed && !balance.eligible.is_zero() {
        return Err(ContractError::DrawLocked { draw_id: draw.id });
    }

    let amount = debit_principal(deps.storage, &mut state, &info.sender, balance)?;
    POOL_STATE.save(deps.storage, &state)?;

    let redeem_msg = MoneyMarket::new(&config.money_market).redeem_msg(amount, &info.sender)?;

    Ok(Response::new()
        .add_message(redeem_msg)
        .add_attribute("action", "withdraw_pool")
        .add_attribute("sender", info.sender.to_string())
        .add_attribute("amount", amount.to_string())
        .add_event(
            Event::new("Withdrawn")
                .add_attribute("sender", info.sender.to_string())
                .add_attribute("amount", amount.to_string()),
        ))
}

/// Withdraw deposits made during the current draw. Never locked.
pub fn withdraw_pending(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut state = POOL_STATE.load(deps.storage)?;

    let balance = load_balance(deps.storage, &info.sender, state.current_draw_id)?;
    if balance.pending.is_zero() {
        return Err(ContractError::NothingToWithdraw);
    }

    let amount = debit_pending(deps.storage, &mut state, &info.sender, balance)?;
    POOL_STATE.save(deps.storage, &state)?;

    let redeem_msg = MoneyMarket::new(&config.money_market).redeem_msg(amount, &info.sender)?;

    Ok(Response::new()
        .add_message(redeem_msg)
        .add_attribute("action", "withdraw_pending")
        .add_attribute("sender", info.sender.to_string())
        .add_attribute("amount", amount.to_string())
        .add_event(
            Event::new("Withdrawn")
                .add_attribute("sender", info.sender.to_string())
                .add_attribute("amount", amount.to_string()),
        ))
}

pub fn withdraw_sponsorship(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    amount: Option<Uint128>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut state = POOL_STATE.load(deps.storage)?;

    let balance = load_balance(deps.storage, &info.sender, state.current_draw_id)?;
    let amount = amount.unwrap_or(balance.sponsorship);
    if amount.is_zero() {
        return Err(ContractError::NothingToWithdraw);
    }

    let amount = debit_sponsorship(deps.storage, &mut state, &info.sender, balance, amount)?;
    POOL_STATE.save(deps.storage, &state)?;

    let redeem_msg = MoneyMarket::new(&config.money_market).redeem_msg(amount, &info.sender)?;

    Ok(Response::new()
        .add_message(redeem_msg)
        .add_attribute("action", "withdraw_sponsorship")
        .add_attribute("sender", info.sender.to_string())
        .add_attribute("amount", amount.to_string())
        .add_event(
            Event::new("SponsorshipWithdrawn")
                .add_attribute("sender", info.sender.to_string())
                .add_attribute("amount", amount.to_string()),
        ))
}

/// Lock the open draw at the current block. Admin only.
pub fn commit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    secret_hash: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender, "commit draws")?;

    let state = POOL_STATE.load(deps.storage)?;
    let mut draw = load_current_draw(deps.storage, &state)?;
    if draw.status != DrawStatus::Open {
        return Err(ContractError::DrawNotOpen { draw_id: draw.id });
    }
    if state.eligible_supply.is_zero() {
        return Err(ContractError::NoEligibleSupply);
    }

    let secret_hash = decode_hash32(&secret_hash).ok_or(ContractError::InvalidHex {
        field: "secret_hash".to_string(),
    })?;

    check_pool_size(&deps.querier, &config, state.total_supply()?)?;

    let commit_block = env.block.height;
    draw.status = DrawStatus::Committed;
    draw.commit_block = Some(commit_block);
    draw.starting_total = state.eligible_supply;
    draw.secret_hash = Some(Binary::from(secret_hash.to_vec()));
    DRAWS.save(deps.storage, draw.id, &draw)?;

    Ok(Response::new()
        .add_attribute("action", "commit")
        .add_attribute("draw_id", draw.id.to_string())
        .add_attribute("starting_total", draw.starting_total.to_string())
        .add_event(
            Event::new("Committed")
                .add_attribute("draw_id", draw.id.to_string())
                .add_attribute("commit_block", commit_block.to_string()),
        ))
}

/// Reward the committed draw and open the next one. Admin only.
///
/// 1. The reveal happens after the commit block and within the reveal window
/// 2. sha256(secret) matches the commitment made at commit time
/// 3. The oracle's hash for the commit block matches `commit_block_hash`
/// 4. The registered signer signed `reward_digest(draw_id, block_hash, secret)`
/// 5. entropy = block_hash XOR secret picks a winner weighted by eligible balance
/// 6. Accrued interest is split into winnings (credited as eligible) and
///    the fee (credited as sponsorship to the fee beneficiary)
pub fn reward_and_commit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    commit_block_hash: String,
    secret: String,
    signature: Binary,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender, "reward draws")?;

    let mut state = POOL_STATE.load(deps.storage)?;
    let mut draw = load_current_draw(deps.storage, &state)?;
    if draw.status != DrawStatus::Committed {
        return Err(ContractError::DrawNotCommitted { draw_id: draw.id });
    }
    let commit_block = draw
        .commit_block
        .ok_or(ContractError::DrawNotCommitted { draw_id: draw.id })?;

    if env.block.height <= commit_block {
        return Err(ContractError::RevealTooEarly {
            draw_id: draw.id,
            commit_block,
        });
    }
    let deadline = commit_block.saturating_add(config.reveal_window_blocks);
    if env.block.height > deadline {
        return Err(ContractError::RevealWindowClosed {
            draw_id: draw.id,
            deadline,
        });
    }

    let secret = decode_hash32(&secret).ok_or(ContractError::InvalidHex {
        field: "secret".to_string(),
    })?;
    let block_hash = decode_hash32(&commit_block_hash).ok_or(ContractError::InvalidHex {
        field: "commit_block_hash".to_string(),
    })?;

    let committed = draw.secret_hash.as_ref().map(|h| h.as_slice());
    if committed != Some(secret_commitment(&secret).as_slice()) {
        return Err(ContractError::CommitMismatch);
    }

    let recorded = query_block_hash(&deps.querier, &config.block_hash_oracle, commit_block)?
        .ok_or(ContractError::BlockHashUnavailable {
            height: commit_block,
        })?;
    if recorded.hash.as_slice() != block_hash.as_slice() {
        return Err(ContractError::BlockHashMismatch {
            height: commit_block,
        });
    }

    let digest = reward_digest(draw.id, &block_hash, &secret);
    let valid = deps
        .api
        .secp256k1_verify(&digest, signature.as_slice(), config.signer_pubkey.as_slice())
        .map_err(|_| ContractError::InvalidSignature)?;
    if !valid {
        return Err(ContractError::InvalidSignature);
    }

    let entropy = derive_entropy(&block_hash, &secret);
    let ticket = reduce_entropy(&entropy, draw.starting_total.u128())
        .ok_or(ContractError::NoEligibleSupply)?;
    let winner = winner_for_ticket(deps.storage, state.current_draw_id, ticket)?
        .ok_or(ContractError::NoWinner { draw_id: draw.id })?;

    let market_balance = MoneyMarket::new(&config.money_market)
        .balance_of(&deps.querier, &env.contract.address)?;
    let accrued = market_balance.saturating_sub(state.total_supply()?);
    let (winnings, fee) = split_interest(accrued, draw.fee_fraction)?;

    credit_eligible(deps.storage, &mut state, &winner, winnings)?;
    if !fee.is_zero() {
        credit_sponsorship(deps.storage, &mut state, &config.fee_beneficiary, fee)?;
    }

    USER_WINS.save(deps.storage, (&winner, draw.id), &())?;
    let wins = USER_WIN_COUNT.may_load(deps.storage, &winner)?.unwrap_or(0);
    USER_WIN_COUNT.save(deps.storage, &winner, &(wins + 1))?;
    let total_won = USER_TOTAL_WON
        .may_load(deps.storage, &winner)?
        .unwrap_or_default();
    USER_TOTAL_WON.save(deps.storage, &winner, &total_won.checked_add(winnings)?)?;

    draw.status = DrawStatus::Rewarded;
    draw.block_hash = Some(Binary::from(block_hash.to_vec()));
    draw.secret = Some(Binary::from(secret.to_vec()));
    draw.entropy = Some(Binary::from(entropy.to_vec()));
    draw.winner = Some(winner.clone());
    draw.accrued_interest = accrued;
    draw.winnings = winnings;
    draw.fee = fee;
    draw.finalized_at_height = Some(env.block.height);
    DRAWS.save(deps.storage, draw.id, &draw)?;

    state.draws_rewarded += 1;
    state.total_winnings_paid = state.total_winnings_paid.checked_add(winnings)?;
    state.total_fees_collected = state.total_fees_collected.checked_add(fee)?;
    let opened = open_next_draw(deps.storage, &mut state, &config, env.block.height)?;
    POOL_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "reward_and_commit")
        .add_attribute("draw_id", draw.id.to_string())
        .add_attribute("winner", winner.to_string())
        .add_attribute("accrued_interest", accrued.to_string())
        .add_event(
            Event::new("Rewarded")
                .add_attribute("draw_id", draw.id.to_string())
                .add_attribute("winner", winner.to_string())
                .add_attribute("secret", hex::encode(secret))
                .add_attribute("winnings", winnings.to_string())
                .add_attribute("fee", fee.to_string()),
        )
        .add_event(opened))
}

/// Close the current draw without a winner and open the next one.
///
/// A committed draw can be cancelled by anyone once its reveal window has
/// passed. An open draw can be cancelled by the admin only while nothing is
/// eligible, which is how the first deposits become eligible.
pub fn cancel_draw(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut state = POOL_STATE.load(deps.storage)?;
    let mut draw = load_current_draw(deps.storage, &state)?;
    let previous_status = draw.status.clone();

    match draw.status {
        DrawStatus::Open => {
            ensure_admin(&config, &info.sender, "cancel open draws")?;
            if !state.eligible_supply.is_zero() {
                return Err(ContractError::DrawHasEligibleSupply { draw_id: draw.id });
            }
        }
        DrawStatus::Committed => {
            let commit_block = draw
                .commit_block
                .ok_or(ContractError::DrawNotCommitted { draw_id: draw.id })?;
            let deadline = commit_block.saturating_add(config.reveal_window_blocks);
            if env.block.height <= deadline {
                return Err(ContractError::RevealWindowOpen {
                    draw_id: draw.id,
                    deadline,
                });
            }
        }
        DrawStatus::Rewarded | DrawStatus::Cancelled => {
            return Err(ContractError::DrawNotCommitted { draw_id: draw.id });
        }
    }

    draw.status = DrawStatus::Cancelled;
    draw.finalized_at_height = Some(env.block.height);
    DRAWS.save(deps.storage, draw.id, &draw)?;

    let opened = open_next_draw(deps.storage, &mut state, &config, env.block.height)?;
    POOL_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "cancel_draw")
        .add_attribute("draw_id", draw.id.to_string())
        .add_attribute("cancelled_by", info.sender.to_string())
        .add_event(
            Event::new("DrawCancelled")
                .add_attribute("draw_id", draw.id.to_string())
                .add_attribute("previous_status", previous_status.as_str()),
        )
        .add_event(opened))
}

/// Set the fee for draws opened from now on. Admin only.
pub fn set_fee_fraction(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    fee_fraction: Decimal,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender, "set the fee fraction")?;

    config.fee_fraction = validate_fee_fraction(fee_fraction)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "set_fee_fraction")
        .add_event(
            Event::new("FeeFractionChanged").add_attribute("new_fraction", fee_fraction.to_string()),
        ))
}

/// Update config. Admin only.
pub fn update_config(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    params: UpdateConfigParams,
) -> Result<Response, ContractError> {
    let UpdateConfigParams {
        admin,
        fee_beneficiary,
        signer_pubkey,
        lock_duration_blocks,
        reveal_window_blocks,
    } = params;

    let mut config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender, "update config")?;

    if let Some(a) = admin {
        config.admin = deps.api.addr_validate(&a)?;
    }
    if let Some(b) = fee_beneficiary {
        config.fee_beneficiary = deps.api.addr_validate(&b)?;
    }
    if let Some(key) = signer_pubkey {
        validate_signer_pubkey(&key)?;
        config.signer_pubkey = key;
    }
    if let Some(blocks) = lock_duration_blocks {
        config.lock_duration_blocks = validate_duration(blocks, "lock_duration_blocks")?;
    }
    if let Some(blocks) = reveal_window_blocks {
        config.reveal_window_blocks = validate_duration(blocks, "reveal_window_blocks")?;
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attribute("action", "update_config"))
}
