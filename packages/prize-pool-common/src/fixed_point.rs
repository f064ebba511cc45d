//! Signed 24-decimal fixed-point arithmetic and the interest projections
//! built on top of it.
//!
//! Token amounts at rest are `Uint128` units and fractions at rest are
//! `cosmwasm_std::Decimal` (unsigned, 18 decimals). `FixedPoint24` is the
//! working representation for any computation mixing the two. Conversions in
//! either direction are explicit and fail rather than round silently.

use std::fmt;

use cosmwasm_std::{Decimal, Int256, Uint128, Uint256, Uint512};
use thiserror::Error;

/// Number of decimal places carried by `FixedPoint24`.
pub const FIXED_DECIMALS: u32 = 24;

const FIXED_1_I128: i128 = 1_000_000_000_000_000_000_000_000;

/// `1.0` in fixed point (10^24).
pub const FIXED_1: Int256 = Int256::from_i128(FIXED_1_I128);

/// 10^(24 - 18): scale between `Decimal` atomics and `FixedPoint24` raw values.
const DECIMAL_TO_FIXED: u128 = 1_000_000;

/// Upper bound accepted for a per-block supply rate mantissa (1e18-scaled).
/// Same ceiling Compound applies to its per-block borrow rate (0.0005%).
pub const MAX_SUPPLY_RATE_MANTISSA: u128 = 5_000_000_000_000;

/// Largest whole number representable in fixed point.
pub fn max_whole() -> Int256 {
    Int256::MAX / FIXED_1
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FixedPointError {
    #[error("fixed-point overflow in {operation}")]
    Overflow { operation: &'static str },

    #[error("fixed-point division by zero")]
    DivideByZero,

    #[error("precision loss converting {value} to {target}")]
    PrecisionLoss { value: String, target: &'static str },

    #[error("negative value {value} cannot be represented as {target}")]
    Negative { value: String, target: &'static str },

    #[error("supply rate mantissa {rate} exceeds maximum {max}")]
    SupplyRateTooHigh { rate: u128, max: u128 },
}

fn overflow(operation: &'static str) -> FixedPointError {
    FixedPointError::Overflow { operation }
}

fn scale() -> Uint256 {
    Uint256::from(FIXED_1_I128 as u128)
}

/// Signed raw value from a magnitude. Magnitudes of 2^255 and above overflow.
fn signed(
    magnitude: Uint256,
    negative: bool,
    operation: &'static str,
) -> Result<Int256, FixedPointError> {
    let value = Int256::from_be_bytes(magnitude.to_be_bytes());
    if value < Int256::zero() {
        return Err(overflow(operation));
    }
    if negative {
        Int256::zero()
            .checked_sub(value)
            .map_err(|_| overflow(operation))
    } else {
        Ok(value)
    }
}

/// Direction applied when a result has digits beyond 24 decimals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    /// Toward negative infinity.
    Floor,
    /// Toward positive infinity.
    Ceil,
}

/// Signed fixed-point number with 24 decimals over a 256-bit raw value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FixedPoint24(Int256);

impl FixedPoint24 {
    pub const ZERO: Self = Self(Int256::zero());
    pub const ONE: Self = Self(FIXED_1);
    pub const MAX: Self = Self(Int256::MAX);

    pub const fn from_raw(raw: Int256) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> Int256 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < Int256::zero()
    }

    pub fn from_whole(value: Int256) -> Result<Self, FixedPointError> {
        value
            .checked_mul(FIXED_1)
            .map(Self)
            .map_err(|_| overflow("from_whole"))
    }

    pub fn from_uint128(value: Uint128) -> Result<Self, FixedPointError> {
        Self::from_whole(Int256::from(value.u128()))
    }

    /// Exact widening of an 18-decimal fraction.
    pub fn from_decimal(value: Decimal) -> Result<Self, FixedPointError> {
        Int256::from(value.atomics().u128())
            .checked_mul(Int256::from(DECIMAL_TO_FIXED))
            .map(Self)
            .map_err(|_| overflow("from_decimal"))
    }

    /// Narrowing to 18 decimals. Fails instead of dropping the six lowest digits.
    pub fn to_decimal(self) -> Result<Decimal, FixedPointError> {
        if self.is_negative() {
            return Err(FixedPointError::Negative {
                value: self.to_string(),
                target: "Decimal",
            });
        }
        let magnitude = self.0.unsigned_abs();
        let divisor = Uint256::from(DECIMAL_TO_FIXED);
        if !(magnitude % divisor).is_zero() {
            return Err(FixedPointError::PrecisionLoss {
                value: self.to_string(),
                target: "Decimal",
            });
        }
        let atomics =
            Uint128::try_from(magnitude / divisor).map_err(|_| overflow("to_decimal"))?;
        Ok(Decimal::raw(atomics.u128()))
    }

    /// Whole units, discarding the fractional part.
    pub fn to_uint256_floor(self) -> Result<Uint256, FixedPointError> {
        if self.is_negative() {
            return Err(FixedPointError::Negative {
                value: self.to_string(),
                target: "Uint256",
            });
        }
        Ok(self.0.unsigned_abs() / scale())
    }

    /// Whole token units, discarding the fractional part.
    pub fn to_uint_floor(self) -> Result<Uint128, FixedPointError> {
        if self.is_negative() {
            return Err(FixedPointError::Negative {
                value: self.to_string(),
                target: "Uint128",
            });
        }
        Uint128::try_from(self.to_uint256_floor()?).map_err(|_| overflow("to_uint_floor"))
    }

    /// Whole token units; any fractional part is an error.
    pub fn to_uint_exact(self) -> Result<Uint128, FixedPointError> {
        if !(self.0.unsigned_abs() % scale()).is_zero() {
            return Err(FixedPointError::PrecisionLoss {
                value: self.to_string(),
                target: "Uint128",
            });
        }
        self.to_uint_floor()
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, FixedPointError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .map_err(|_| overflow("add"))
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, FixedPointError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .map_err(|_| overflow("sub"))
    }

    pub fn mul(self, rhs: Self, rounding: Rounding) -> Result<Self, FixedPointError> {
        let numerator = self.0.unsigned_abs().full_mul(rhs.0.unsigned_abs());
        let negative = self.is_negative() != rhs.is_negative();
        Self::from_ratio(numerator, Uint512::from(scale()), negative, rounding, "mul")
    }

    pub fn div(self, rhs: Self, rounding: Rounding) -> Result<Self, FixedPointError> {
        if rhs.0.is_zero() {
            return Err(FixedPointError::DivideByZero);
        }
        let numerator = self.0.unsigned_abs().full_mul(scale());
        let negative = self.is_negative() != rhs.is_negative();
        Self::from_ratio(
            numerator,
            Uint512::from(rhs.0.unsigned_abs()),
            negative,
            rounding,
            "div",
        )
    }

    /// `numerator / denominator` as a signed raw value. Both inputs are magnitudes.
    fn from_ratio(
        numerator: Uint512,
        denominator: Uint512,
        negative: bool,
        rounding: Rounding,
        operation: &'static str,
    ) -> Result<Self, FixedPointError> {
        let quotient = numerator / denominator;
        let inexact = !(numerator % denominator).is_zero();
        let away_from_zero = inexact
            && match rounding {
                Rounding::Floor => negative,
                Rounding::Ceil => !negative,
            };
        let quotient = if away_from_zero {
            quotient
                .checked_add(Uint512::one())
                .map_err(|_| overflow(operation))?
        } else {
            quotient
        };

        let magnitude = Uint256::try_from(quotient).map_err(|_| overflow(operation))?;
        signed(magnitude, negative, operation).map(Self)
    }
}

impl fmt::Display for FixedPoint24 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let whole = magnitude / scale();
        let fraction = magnitude % scale();
        if fraction.is_zero() {
            return write!(f, "{sign}{whole}");
        }
        let digits = format!(
            "{:0>width$}",
            fraction.to_string(),
            width = FIXED_DECIMALS as usize
        );
        write!(f, "{sign}{whole}.{}", digits.trim_end_matches('0'))
    }
}

/// Reject supply rates whose magnitude no real market would report.
pub fn validate_supply_rate(supply_rate_mantissa: Uint128) -> Result<Uint128, FixedPointError> {
    if supply_rate_mantissa.u128() > MAX_SUPPLY_RATE_MANTISSA {
        return Err(FixedPointError::SupplyRateTooHigh {
            rate: supply_rate_mantissa.u128(),
            max: MAX_SUPPLY_RATE_MANTISSA,
        });
    }
    Ok(supply_rate_mantissa)
}

/// Simple interest expected over `blocks` at the given per-block rate.
pub fn estimated_interest_rate(
    blocks: u64,
    supply_rate_mantissa: Uint128,
) -> Result<Decimal, FixedPointError> {
    let rate = validate_supply_rate(supply_rate_mantissa)?;
    rate.u128()
        .checked_mul(blocks as u128)
        .map(Decimal::raw)
        .ok_or_else(|| overflow("estimated_interest_rate"))
}

/// Same projection as [`estimated_interest_rate`], in fixed point.
pub fn current_interest_fraction(
    block_duration: u64,
    supply_rate_mantissa: Uint128,
) -> Result<FixedPoint24, FixedPointError> {
    FixedPoint24::from_decimal(estimated_interest_rate(block_duration, supply_rate_mantissa)?)
}

/// Largest pool total that still fits in fixed point after growing by the
/// estimated interest over `blocks`. Rounded down.
pub fn max_pool_size(
    blocks: u64,
    supply_rate_mantissa: Uint128,
) -> Result<FixedPoint24, FixedPointError> {
    let growth =
        FixedPoint24::ONE.checked_add(current_interest_fraction(blocks, supply_rate_mantissa)?)?;
    FixedPoint24::from_whole(max_whole())?.div(growth, Rounding::Floor)
}

/// [`max_pool_size`] in token units. Saturates at `Uint128::MAX`, the
/// largest total the pool can hold in the first place.
pub fn max_pool_size_units(
    blocks: u64,
    supply_rate_mantissa: Uint128,
) -> Result<Uint128, FixedPointError> {
    let units = max_pool_size(blocks, supply_rate_mantissa)?.to_uint256_floor()?;
    Ok(Uint128::try_from(units).unwrap_or(Uint128::MAX))
}

/// Split accrued interest into `(winnings, fee)`.
///
/// The fee is rounded down and the winner receives the remainder, so the two
/// parts always sum to `accrued`.
pub fn split_interest(
    accrued: Uint128,
    fee_fraction: Decimal,
) -> Result<(Uint128, Uint128), FixedPointError> {
    let fee = FixedPoint24::from_uint128(accrued)?
        .mul(FixedPoint24::from_decimal(fee_fraction)?, Rounding::Floor)?
        .to_uint_floor()?;
    let winnings = accrued
        .checked_sub(fee)
        .map_err(|_| overflow("split_interest"))?;
    Ok((winnings, fee))
}
