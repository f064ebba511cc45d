use cosmwasm_std::{Addr, Order, StdResult, Storage, Uint128};
use prize_pool_common::reduce_entropy;

use crate::state::{BALANCES, DEPOSITORS};

/// Walk depositors in registration order and return the first whose
/// cumulative eligible balance exceeds `ticket`.
pub fn winner_for_ticket(
    storage: &dyn Storage,
    current_draw_id: u64,
    ticket: u128,
) -> StdResult<Option<Addr>> {
    let mut cumulative = Uint128::zero();
    for item in DEPOSITORS.range(storage, None, None, Order::Ascending) {
        let (_, addr) = item?;
        let eligible = match BALANCES.may_load(storage, &addr)? {
            Some(balance) => balance.normalized(current_draw_id).eligible,
            None => continue,
        };
        if eligible.is_zero() {
            continue;
        }
        cumulative = cumulative.checked_add(eligible)?;
        if cumulative.u128() > ticket {
            return Ok(Some(addr));
        }
    }
    Ok(None)
}

/// Map entropy to a depositor, weighted by eligible balance. `None` when
/// nothing is eligible.
pub fn calculate_winner(
    storage: &dyn Storage,
    current_draw_id: u64,
    eligible_supply: Uint128,
    entropy: &[u8; 32],
) -> StdResult<Option<Addr>> {
    match reduce_entropy(entropy, eligible_supply.u128()) {
        Some(ticket) => winner_for_ticket(storage, current_draw_id, ticket),
        None => Ok(None),
    }
}
