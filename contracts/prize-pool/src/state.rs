use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, Decimal, StdResult, Uint128};
use cw_storage_plus::{Item, Map};
use prize_pool_common::DrawStatus;

pub const CONFIG: Item<PoolConfig> = Item::new("config");
pub const POOL_STATE: Item<PoolState> = Item::new("pool_state");
pub const DRAWS: Map<u64, Draw> = Map::new("draws");
pub const BALANCES: Map<&Addr, UserBalance> = Map::new("balances");

/// Depositors holding principal, in registration order; the winner walk
/// follows this order. Removed once their eligible and pending balances are zero.
pub const DEPOSITORS: Map<u64, Addr> = Map::new("depositors");
pub const DEPOSITOR_INDEX: Map<&Addr, u64> = Map::new("depositor_index");

/// Per-user win tracking
pub const USER_WINS: Map<(&Addr, u64), ()> = Map::new("user_wins");
pub const USER_WIN_COUNT: Map<&Addr, u32> = Map::new("user_win_count");
pub const USER_TOTAL_WON: Map<&Addr, Uint128> = Map::new("user_total_won");

#[cw_serde]
pub struct PoolConfig {
    pub admin: Addr,
    pub money_market: Addr,
    /// Principal token, a native denom.
    pub denom: String,
    /// Applied to draws opened from now on.
    pub fee_fraction: Decimal,
    /// Receives the fee as sponsorship balance.
    pub fee_beneficiary: Addr,
    pub block_hash_oracle: Addr,
    /// secp256k1 key that authorizes reveals, 33 or 65 bytes.
    pub signer_pubkey: Binary,
    /// Expected length of a draw, used for the max pool size projection.
    pub lock_duration_blocks: u64,
    /// Blocks after the commit block during which a reveal is accepted.
    pub reveal_window_blocks: u64,
}

#[cw_serde]
pub struct PoolState {
    pub current_draw_id: u64,
    pub eligible_supply: Uint128,
    pub pending_supply: Uint128,
    pub sponsorship_supply: Uint128,
    /// Depositors currently registered.
    pub depositor_count: u64,
    /// Key handed to the next registered depositor.
    pub next_depositor_index: u64,
    pub draws_rewarded: u64,
    pub total_winnings_paid: Uint128,
    pub total_fees_collected: Uint128,
}

impl PoolState {
    /// Principal under management: everything owed back to users.
    pub fn total_supply(&self) -> StdResult<Uint128> {
        Ok(self
            .eligible_supply
            .checked_add(self.pending_supply)?
            .checked_add(self.sponsorship_supply)?)
    }
}

#[cw_serde]
pub struct Draw {
    pub id: u64,
    pub status: DrawStatus,
    /// Eligible supply when opened, re-snapshotted at commit.
    pub starting_total: Uint128,
    pub fee_fraction: Decimal,
    pub opened_at_height: u64,
    pub commit_block: Option<u64>,
    /// sha256 of the reveal secret
    pub secret_hash: Option<Binary>,
    pub block_hash: Option<Binary>,
    pub secret: Option<Binary>,
    pub entropy: Option<Binary>,
    pub winner: Option<Addr>,
    pub accrued_interest: Uint128,
    pub winnings: Uint128,
    pub fee: Uint128,
    pub finalized_at_height: Option<u64>,
}

impl Draw {
    pub fn open(id: u64, starting_total: Uint128, fee_fraction: Decimal, height: u64) -> Self {
        Draw {
            id,
            status: DrawStatus::Open,
            starting_total,
            fee_fraction,
            opened_at_height: height,
            commit_block: None,
            secret_hash: None,
            block_hash: None,
            secret: None,
            entropy: None,
            winner: None,
            accrued_interest: Uint128::zero(),
            winnings: Uint128::zero(),
            fee: Uint128::zero(),
            finalized_at_height: None,
        }
    }
}

/// A user's principal. `pending` was deposited during draw `pending_draw_id`
/// and counts as eligible once that draw is finalized.
#[cw_serde]
#[derive(Default)]
pub struct UserBalance {
    pub eligible: Uint128,
    pub pending: Uint128,
    pub pending_draw_id: u64,
    pub sponsorship: Uint128,
}
