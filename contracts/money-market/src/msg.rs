use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Decimal, Uint128};

use crate::state::MarketConfig;

#[cw_serde]
pub struct InstantiateMsg {
    pub denom: String,
    pub supply_rate_mantissa: Uint128,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Supply the attached funds. Interest accrues from the next block.
    Supply {},
    /// Redeem principal plus interest, paid to `recipient` (defaults to sender).
    Redeem {
        amount: Uint128,
        recipient: Option<String>,
    },
    /// Add funds backing interest payouts.
    FundReserves {},
    /// Admin only. Interest up to the current block accrues at the old rate.
    SetSupplyRate { supply_rate_mantissa: Uint128 },
    /// Admin only.
    UpdateConfig { admin: Option<String> },
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(MarketConfig)]
    Config {},
    #[returns(MarketStateResponse)]
    MarketState {},
    /// Current balance of `address` including accrued interest.
    #[returns(Uint128)]
    BalanceOf { address: String },
    #[returns(Uint128)]
    SupplyRateMantissa {},
}

#[cw_serde]
pub struct MarketStateResponse {
    pub supply_index: Decimal,
    pub last_accrual_height: u64,
    pub total_supplied: Uint128,
    /// Bank balance beyond `total_supplied`.
    pub reserves: Uint128,
}
