use cosmwasm_schema::cw_serde;

/// The lifecycle status of a draw.
#[cw_serde]
pub enum DrawStatus {
    /// Accepting deposits, no commitment yet.
    Open,
    /// Locked: eligible balances are frozen until reward or cancellation.
    Committed,
    Rewarded,
    /// Closed without a winner (empty draw, or reveal window missed).
    Cancelled,
}

impl DrawStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrawStatus::Open => "open",
            DrawStatus::Committed => "committed",
            DrawStatus::Rewarded => "rewarded",
            DrawStatus::Cancelled => "cancelled",
        }
    }
}
