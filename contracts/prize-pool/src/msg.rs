use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Decimal, Int256, Uint128};

use crate::state::{Draw, PoolConfig};

#[cw_serde]
pub struct InstantiateMsg {
    pub money_market: String,
    pub denom: String,
    pub fee_fraction: Decimal,
    /// Defaults to the instantiating admin.
    pub fee_beneficiary: Option<String>,
    pub block_hash_oracle: String,
    /// secp256k1 public key (33 or 65 bytes) authorizing reveals.
    pub signer_pubkey: Binary,
    pub lock_duration_blocks: u64,
    pub reveal_window_blocks: u64,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Deposit the attached funds. They become eligible in the next draw.
    DepositPool {},
    /// Deposit the attached funds as sponsorship: yield without tickets.
    DepositSponsorship {},
    /// Withdraw all eligible and pending principal, winnings included.
    WithdrawPool {},
    /// Withdraw only deposits that are not yet eligible.
    WithdrawPending {},
    /// Withdraw sponsorship (and collected fees). Defaults to the full balance.
    WithdrawSponsorship { amount: Option<Uint128> },
    /// Lock the open draw. Admin only.
    Commit {
        /// hex sha256 of the 32-byte secret revealed at reward time
        secret_hash: String,
    },
    /// Reveal the secret, pay the winner and open the next draw. Admin only.
    RewardAndCommit {
        commit_block_hash: String,
        secret: String,
        /// 64-byte secp256k1 signature over the reward digest
        signature: Binary,
    },
    /// Recover a draw whose reveal window elapsed, or skip an open draw
    /// with nothing eligible (admin).
    CancelDraw {},
    /// Admin only. Applies to draws opened afterwards.
    SetFeeFraction { fee_fraction: Decimal },
    /// Admin only.
    UpdateConfig {
        admin: Option<String>,
        fee_beneficiary: Option<String>,
        signer_pubkey: Option<Binary>,
        lock_duration_blocks: Option<u64>,
        reveal_window_blocks: Option<u64>,
    },
}

/// Fields of [`ExecuteMsg::UpdateConfig`].
pub struct UpdateConfigParams {
    pub admin: Option<String>,
    pub fee_beneficiary: Option<String>,
    pub signer_pubkey: Option<Binary>,
    pub lock_duration_blocks: Option<u64>,
    pub reveal_window_blocks: Option<u64>,
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(PoolConfig)]
    Config {},
    #[returns(PoolStateResponse)]
    PoolState {},
    #[returns(Draw)]
    Draw { draw_id: u64 },
    #[returns(DrawHistoryResponse)]
    DrawHistory {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(Option<u64>)]
    CurrentOpenDrawId {},
    /// Eligible plus pending principal.
    #[returns(Uint128)]
    BalanceOf { address: String },
    #[returns(UserBalanceResponse)]
    UserBalance { address: String },
    #[returns(Uint128)]
    BalanceOfSponsorship { address: String },
    /// Projected split if the current draw were rewarded now.
    #[returns(WinningsResponse)]
    Winnings {},
    #[returns(UserWinsResponse)]
    UserWins {
        address: String,
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    /// Winner for hex-encoded 32-byte entropy against the current eligible supply.
    #[returns(Option<Addr>)]
    CalculateWinner { entropy: String },
    /// Raw fixed point (24 decimals).
    #[returns(Int256)]
    MaxPoolSizeFixedPoint24 { blocks: u64 },
    #[returns(Uint128)]
    SupplyRateMantissa {},
    #[returns(Decimal)]
    EstimatedInterestRate { blocks: u64 },
}

#[cw_serde]
pub struct PoolStateResponse {
    pub current_draw_id: u64,
    pub eligible_supply: Uint128,
    pub pending_supply: Uint128,
    pub sponsorship_supply: Uint128,
    pub total_supply: Uint128,
    pub depositor_count: u64,
    pub draws_rewarded: u64,
    pub total_winnings_paid: Uint128,
    pub total_fees_collected: Uint128,
}

#[cw_serde]
pub struct DrawHistoryResponse {
    pub draws: Vec<Draw>,
}

#[cw_serde]
pub struct UserBalanceResponse {
    pub address: String,
    pub eligible: Uint128,
    pub pending: Uint128,
    pub sponsorship: Uint128,
}

#[cw_serde]
pub struct WinningsResponse {
    pub draw_id: u64,
    pub accrued_interest: Uint128,
    pub winnings: Uint128,
    pub fee: Uint128,
}

#[cw_serde]
pub struct UserWinsResponse {
    pub address: String,
    pub total_wins: u32,
    pub total_won_amount: Uint128,
    pub draw_ids: Vec<u64>,
}

/// Money market messages used by the pool.
#[cw_serde]
pub enum MoneyMarketExecuteMsg {
    Supply {},
    Redeem {
        amount: Uint128,
        recipient: Option<String>,
    },
}

#[cw_serde]
pub enum MoneyMarketQueryMsg {
    BalanceOf { address: String },
    SupplyRateMantissa {},
}

/// Block hash oracle query used by the pool.
#[cw_serde]
pub enum OracleQueryMsg {
    BlockHash { height: u64 },
}

/// Mirrors the oracle's block hash response.
#[cw_serde]
pub struct BlockHashResponse {
    pub height: u64,
    pub hash: Binary,
}
