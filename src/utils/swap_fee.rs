//! ## Swap Fee
//! Implicit fee of an exact-input swap: the surplus of the realised output over what the same input
//! would have bought at the post-swap marginal price.

use super::{mul_div_down, mul_div_up};
use crate::{entities::SwapDirection, error::Error};
use alloy_primitives::{U160, U256};
use serde::{Deserialize, Serialize};

/// 2^96
pub const Q96: U256 = U256::from_limbs([0, 1 << 32, 0, 0]);

pub const BIPS_DENOMINATOR: u16 = 10_000;
pub const MIN_PROTOCOL_FEE_BIPS: u16 = 1_000;
pub const MAX_PROTOCOL_FEE_BIPS: u16 = BIPS_DENOMINATOR;

/// Output `amount_in` would buy at `sqrt_price_x96`. Each step rounds down, in both directions, so
/// the result never exceeds the exact value and the fee is never understated.
///
/// ## Arguments
///
/// * `direction`: The swap direction
/// * `amount_in`: The exact input amount
/// * `sqrt_price_x96`: The post-swap sqrt price of the pool
#[inline]
pub fn counterfactual_output(
    direction: SwapDirection,
    amount_in: U256,
    sqrt_price_x96: U160,
) -> Result<U256, Error> {
    let sqrt_price = U256::from(sqrt_price_x96);
    match direction {
        SwapDirection::ZeroForOne => {
            let partial = mul_div_down(amount_in, sqrt_price, Q96)?;
            mul_div_down(partial, sqrt_price, Q96)
        }
        SwapDirection::OneForZero => {
            let partial = mul_div_down(amount_in, Q96, sqrt_price)?;
            mul_div_down(partial, Q96, sqrt_price)
        }
    }
}

/// `actual_out - counterfactual_out`, floored at zero.
#[inline]
pub fn implicit_fee(
    direction: SwapDirection,
    amount_in: U256,
    amount_out: U256,
    sqrt_price_x96: U160,
) -> Result<U256, Error> {
    let counterfactual = counterfactual_output(direction, amount_in, sqrt_price_x96)?;
    Ok(amount_out.saturating_sub(counterfactual))
}

/// Division of an implicit fee between the pool's liquidity providers and the protocol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub total: U256,
    /// Donated back to the pool.
    pub redistributed: U256,
    /// Kept by the protocol, rounded up.
    pub retained: U256,
}

impl FeeSplit {
    #[inline]
    pub fn new(total: U256, protocol_fee_bips: u16) -> Result<Self, Error> {
        let retained = mul_div_up(
            total,
            U256::from(protocol_fee_bips),
            U256::from(BIPS_DENOMINATOR),
        )?;
        let redistributed = total
            .checked_sub(retained)
            .ok_or(Error::InvalidProtocolFeeBips(protocol_fee_bips))?;
        Ok(Self {
            total,
            redistributed,
            retained,
        })
    }

    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.total.is_zero()
    }
}

#[inline]
pub const fn validate_protocol_fee_bips(bips: u16) -> Result<u16, Error> {
    if bips < MIN_PROTOCOL_FEE_BIPS || bips > MAX_PROTOCOL_FEE_BIPS {
        return Err(Error::InvalidProtocolFeeBips(bips));
    }
    Ok(bips)
}
