use cosmwasm_std::{
    to_json_binary, Addr, Coin, CosmosMsg, QuerierWrapper, QueryRequest, StdResult, Uint128,
    WasmMsg, WasmQuery,
};

use crate::msg::{MoneyMarketExecuteMsg, MoneyMarketQueryMsg};

/// Client for the interest-bearing market holding the pool's principal.
pub struct MoneyMarket<'a> {
    addr: &'a Addr,
}

impl<'a> MoneyMarket<'a> {
    pub fn new(addr: &'a Addr) -> Self {
        MoneyMarket { addr }
    }

    pub fn supply_msg(&self, funds: Coin) -> StdResult<CosmosMsg> {
        Ok(WasmMsg::Execute {
            contract_addr: self.addr.to_string(),
            msg: to_json_binary(&MoneyMarketExecuteMsg::Supply {})?,
            funds: vec![funds],
        }
        .into())
    }

    /// Redeem from the pool's position straight to `recipient`.
    pub fn redeem_msg(&self, amount: Uint128, recipient: &Addr) -> StdResult<CosmosMsg> {
        Ok(WasmMsg::Execute {
            contract_addr: self.addr.to_string(),
            msg: to_json_binary(&MoneyMarketExecuteMsg::Redeem {
                amount,
                recipient: Some(recipient.to_string()),
            })?,
            funds: vec![],
        }
        .into())
    }

    /// Principal plus interest the market holds for `holder`.
    pub fn balance_of(&self, querier: &QuerierWrapper, holder: &Addr) -> StdResult<Uint128> {
        querier.query(&QueryRequest::Wasm(WasmQuery::Smart {
            contract_addr: self.addr.to_string(),
            msg: to_json_binary(&MoneyMarketQueryMsg::BalanceOf {
                address: holder.to_string(),
            })?,
        }))
    }

    /// Per-block supply rate scaled by 1e18. Unvalidated.
    pub fn supply_rate_mantissa(&self, querier: &QuerierWrapper) -> StdResult<Uint128> {
        querier.query(&QueryRequest::Wasm(WasmQuery::Smart {
            contract_addr: self.addr.to_string(),
            msg: to_json_binary(&MoneyMarketQueryMsg::SupplyRateMantissa {})?,
        }))
    }
}
