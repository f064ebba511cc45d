use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Decimal, StdError, StdResult, Uint128};
use cw_storage_plus::{Item, Map};

pub const CONFIG: Item<MarketConfig> = Item::new("config");
pub const MARKET_STATE: Item<MarketState> = Item::new("market_state");
pub const POSITIONS: Map<&Addr, Position> = Map::new("positions");

#[cw_serde]
pub struct MarketConfig {
    pub admin: Addr,
    pub denom: String,
    /// Interest earned per block by suppliers, scaled by 1e18.
    pub supply_rate_mantissa: Uint128,
}

#[cw_serde]
pub struct MarketState {
    /// Cumulative growth factor since instantiation, starts at 1.
    pub supply_index: Decimal,
    pub last_accrual_height: u64,
    /// Sum of supplier balances as of their last touch.
    pub total_supplied: Uint128,
}

#[cw_serde]
pub struct Position {
    pub balance: Uint128,
    /// Supply index at the time `balance` was last written.
    pub index: Decimal,
}

impl MarketState {
    /// Index as of `height`: `index * (1 + rate * blocks_elapsed)`.
    pub fn index_at(&self, supply_rate_mantissa: Uint128, height: u64) -> StdResult<Decimal> {
        let blocks = height.saturating_sub(self.last_accrual_height);
        if blocks == 0 || supply_rate_mantissa.is_zero() {
            return Ok(self.supply_index);
        }
        let growth = Decimal::raw(supply_rate_mantissa.u128())
            .checked_mul(Decimal::from_ratio(blocks, 1u64))?
            .checked_add(Decimal::one())?;
        Ok(self.supply_index.checked_mul(growth)?)
    }
}

impl Position {
    /// Balance grown from the position's index to `index_now`.
    pub fn balance_at(&self, index_now: Decimal) -> StdResult<Uint128> {
        if self.index.is_zero() {
            return Ok(self.balance);
        }
        self.balance
            .checked_multiply_ratio(index_now.atomics(), self.index.atomics())
            .map_err(|e| StdError::generic_err(e.to_string()))
    }
}
