pub mod contract;
pub mod error;
pub mod execute;
pub mod ledger;
pub mod money_market;
pub mod msg;
pub mod oracle;
pub mod query;
pub mod selection;
pub mod state;

pub use crate::error::ContractError;
