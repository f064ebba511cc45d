pub mod entropy;
pub mod fixed_point;
pub mod types;

pub use entropy::{derive_entropy, reduce_entropy, reward_digest, secret_commitment};
pub use fixed_point::{FixedPoint24, FixedPointError, Rounding};
pub use types::DrawStatus;
