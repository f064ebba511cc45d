use cosmwasm_std::{to_json_binary, Addr, QuerierWrapper, QueryRequest, StdResult, WasmQuery};

use crate::msg::{BlockHashResponse, OracleQueryMsg};

/// Hash of block `height` as reported by the oracle, `None` once expired.
pub fn query_block_hash(
    querier: &QuerierWrapper,
    oracle: &Addr,
    height: u64,
) -> StdResult<Option<BlockHashResponse>> {
    querier.query(&QueryRequest::Wasm(WasmQuery::Smart {
        contract_addr: oracle.to_string(),
        msg: to_json_binary(&OracleQueryMsg::BlockHash { height })?,
    }))
}
