use cosmwasm_std::{Addr, Storage, Uint128};

use crate::error::ContractError;
use crate::state::{PoolState, UserBalance, BALANCES, DEPOSITORS, DEPOSITOR_INDEX};

impl UserBalance {
    /// Pending funds from a finalized draw count as eligible.
    pub fn normalized(mut self, current_draw_id: u64) -> Self {
        if !self.pending.is_zero() && self.pending_draw_id < current_draw_id {
            self.eligible += self.pending;
            self.pending = Uint128::zero();
        }
        self
    }

    pub fn principal(&self) -> Result<Uint128, ContractError> {
        Ok(self.eligible.checked_add(self.pending)?)
    }

    pub fn is_empty(&self) -> bool {
        self.eligible.is_zero() && self.pending.is_zero() && self.sponsorship.is_zero()
    }
}

pub fn load_balance(
    storage: &dyn Storage,
    addr: &Addr,
    current_draw_id: u64,
) -> Result<UserBalance, ContractError> {
    Ok(BALANCES
        .may_load(storage, addr)?
        .unwrap_or_default()
        .normalized(current_draw_id))
}

pub fn save_balance(
    storage: &mut dyn Storage,
    addr: &Addr,
    balance: &UserBalance,
) -> Result<(), ContractError> {
    if balance.is_empty() {
        BALANCES.remove(storage, addr);
    } else {
        BALANCES.save(storage, addr, balance)?;
    }
    Ok(())
}

/// Append `addr` to the depositor enumeration if it is not there yet.
fn register_depositor(
    storage: &mut dyn Storage,
    state: &mut PoolState,
    addr: &Addr,
) -> Result<(), ContractError> {
    if DEPOSITOR_INDEX.has(storage, addr) {
        return Ok(());
    }
    let index = state.next_depositor_index;
    DEPOSITORS.save(storage, index, addr)?;
    DEPOSITOR_INDEX.save(storage, addr, &index)?;
    state.next_depositor_index += 1;
    state.depositor_count += 1;
    Ok(())
}

/// Drop `addr` from the enumeration once it holds no principal. A later
/// deposit registers it again at the end.
fn deregister_if_empty(
    storage: &mut dyn Storage,
    state: &mut PoolState,
    addr: &Addr,
    balance: &UserBalance,
) -> Result<(), ContractError> {
    if !balance.principal()?.is_zero() {
        return Ok(());
    }
    if let Some(index) = DEPOSITOR_INDEX.may_load(storage, addr)? {
        DEPOSITORS.remove(storage, index);
        DEPOSITOR_INDEX.remove(storage, addr);
        state.depositor_count -= 1;
    }
    Ok(())
}

/// Record a pool deposit for the current draw. Eligible from the next draw on.
pub fn credit_pending(
    storage: &mut dyn Storage,
    state: &mut PoolState,
    addr: &Addr,
    amount: Uint128,
) -> Result<UserBalance, ContractError> {
    let mut balance = load_balance(storage, addr, state.current_draw_id)?;
    balance.pending = balance.pending.checked_add(amount)?;
    balance.pending_draw_id = state.current_draw_id;
    state.pending_supply = state.pending_supply.checked_add(amount)?;

    register_depositor(storage, state, addr)?;
    save_balance(storage, addr, &balance)?;
    Ok(balance)
}

/// Credit immediately eligible funds, used for winnings.
pub fn credit_eligible(
    storage: &mut dyn Storage,
    state: &mut PoolState,
    addr: &Addr,
    amount: Uint128,
) -> Result<UserBalance, ContractError> {
    let mut balance = load_balance(storage, addr, state.current_draw_id)?;
    balance.eligible = balance.eligible.checked_add(amount)?;
    state.eligible_supply = state.eligible_supply.checked_add(amount)?;

    register_depositor(storage, state, addr)?;
    save_balance(storage, addr, &balance)?;
    Ok(balance)
}

/// Sponsorship earns yield for the pool but never enters the draw.
pub fn credit_sponsorship(
    storage: &mut dyn Storage,
    state: &mut PoolState,
    addr: &Addr,
    amount: Uint128,
) -> Result<UserBalance, ContractError> {
    let mut balance = load_balance(storage, addr, state.current_draw_id)?;
    balance.sponsorship = balance.sponsorship.checked_add(amount)?;
    state.sponsorship_supply = state.sponsorship_supply.checked_add(amount)?;

    save_balance(storage, addr, &balance)?;
    Ok(balance)
}

/// Remove all eligible and pending principal of `addr`. Returns the amount removed.
pub fn debit_principal(
    storage: &mut dyn Storage,
    state: &mut PoolState,
    addr: &Addr,
    mut balance: UserBalance,
) -> Result<Uint128, ContractError> {
    let amount = balance.principal()?;
    state.eligible_supply = state.eligible_supply.checked_sub(balance.eligible)?;
    state.pending_supply = state.pending_supply.checked_sub(balance.pending)?;
    balance.eligible = Uint128::zero();
    balance.pending = Uint128::zero();
    deregister_if_empty(storage, state, addr, &balance)?;
    save_balance(storage, addr, &balance)?;
    Ok(amount)
}

/// Remove only the not-yet-eligible part of `addr`'s principal.
pub fn debit_pending(
    storage: &mut dyn Storage,
    state: &mut PoolState,
    addr: &Addr,
    mut balance: UserBalance,
) -> Result<Uint128, ContractError> {
    let amount = balance.pending;
    state.pending_supply = state.pending_supply.checked_sub(amount)?;
    balance.pending = Uint128::zero();
    deregister_if_empty(storage, state, addr, &balance)?;
    save_balance(storage, addr, &balance)?;
    Ok(amount)
}

pub fn debit_sponsorship(
    storage: &mut dyn Storage,
    state: &mut PoolState,
    addr: &Addr,
    mut balance: UserBalance,
    amount: Uint128,
) -> Result<Uint128, ContractError> {
    if amount > balance.sponsorship {
        return Err(ContractError::InsufficientSponsorship {
            requested: amount,
            available: balance.sponsorship,
        });
    }
    balance.sponsorship -= amount;
    state.sponsorship_supply = state.sponsorship_supply.checked_sub(amount)?;
    save_balance(storage, addr, &balance)?;
    Ok(amount)
}

/// Aggregate counterpart of [`UserBalance::normalized`], applied when a draw
/// is finalized.
pub fn promote_pending(state: &mut PoolState) -> Result<(), ContractError> {
    state.eligible_supply = state.eligible_supply.checked_add(state.pending_supply)?;
    state.pending_supply = Uint128::zero();
    Ok(())
}
