//! ## Full Math
//! 512-bit intermediate `a * b / denominator` with explicit rounding.

use crate::error::Error;
use alloy_primitives::{U256, U512};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Toward negative infinity.
    Floor,
    /// Toward positive infinity.
    Ceil,
}

/// Calculates `a * b / denominator` with full precision.
///
/// ## Arguments
///
/// * `a`: The multiplicand
/// * `b`: The multiplier
/// * `denominator`: The divisor
/// * `rounding`: The rounding direction of the division
#[inline]
pub fn mul_div(a: U256, b: U256, denominator: U256, rounding: Rounding) -> Result<U256, Error> {
    if denominator.is_zero() {
        return Err(Error::DivisionByZero);
    }
    let prod = U512::from(a) * U512::from(b);
    let denominator = U512::from(denominator);
    let adjusted = match rounding {
        Rounding::Floor => prod,
        Rounding::Ceil => prod + denominator - U512::from(1),
    };
    let result = adjusted / denominator;
    if result > U512::from(U256::MAX) {
        return Err(Error::Overflow);
    }
    Ok(U256::from(result))
}

#[inline]
pub fn mul_div_down(a: U256, b: U256, denominator: U256) -> Result<U256, Error> {
    mul_div(a, b, denominator, Rounding::Floor)
}

#[inline]
pub fn mul_div_up(a: U256, b: U256, denominator: U256) -> Result<U256, Error> {
    mul_div(a, b, denominator, Rounding::Ceil)
}
