//! ## Pool Key
//! Pool identity helpers on top of the ABI [`PoolKey`] struct.

use crate::{
    abi::{PoolKey, SwapParams},
    error::Error,
};
use alloy_primitives::{
    aliases::{I24, U24},
    keccak256, Address, B256, I256,
};
use alloy_sol_types::SolValue;
use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};
use uniswap_sdk_core::prelude::*;

/// `keccak256(abi.encode(poolKey))`
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deref, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PoolId(B256);

impl core::fmt::Display for PoolId {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// The direction of a swap. Zero-for-one is the "forward" direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SwapDirection {
    ZeroForOne,
    OneForZero,
}

impl SwapDirection {
    #[inline]
    #[must_use]
    pub const fn from_zero_for_one(zero_for_one: bool) -> Self {
        if zero_for_one {
            Self::ZeroForOne
        } else {
            Self::OneForZero
        }
    }

    #[inline]
    #[must_use]
    pub const fn zero_for_one(self) -> bool {
        matches!(self, Self::ZeroForOne)
    }
}

impl core::fmt::Display for SwapDirection {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ZeroForOne => f.write_str("zero-for-one"),
            Self::OneForZero => f.write_str("one-for-zero"),
        }
    }
}

fn currency_address(currency: &impl BaseCurrency) -> Address {
    if currency.is_native() {
        Address::ZERO
    } else {
        currency.wrapped().address()
    }
}

impl PoolKey {
    /// Creates a pool key from raw currency addresses, which must already be sorted.
    #[inline]
    pub fn new(
        currency0: Address,
        currency1: Address,
        fee: U24,
        tick_spacing: I24,
        hooks: Address,
    ) -> Result<Self, Error> {
        if currency0 >= currency1 {
            return Err(Error::CurrenciesOutOfOrder);
        }
        Ok(Self {
            currency0,
            currency1,
            fee,
            tickSpacing: tick_spacing,
            hooks,
        })
    }

    /// Creates a pool key from two SDK currencies in any order. Native currency maps to the zero
    /// address and therefore always sorts first.
    #[inline]
    pub fn from_currencies(
        currency_a: &Currency,
        currency_b: &Currency,
        fee: U24,
        tick_spacing: I24,
        hooks: Address,
    ) -> Result<Self, Error> {
        let address_a = currency_address(currency_a);
        let address_b = currency_address(currency_b);
        let (currency0, currency1) = if address_a < address_b {
            (address_a, address_b)
        } else {
            (address_b, address_a)
        };
        Self::new(currency0, currency1, fee, tick_spacing, hooks)
    }

    #[inline]
    #[must_use]
    pub fn pool_id(&self) -> PoolId {
        PoolId(keccak256(self.abi_encode()))
    }

    /// The LP fee as a plain integer.
    #[inline]
    #[must_use]
    pub fn lp_fee(&self) -> u32 {
        self.fee.to()
    }
}

impl From<&PoolKey> for PoolId {
    #[inline]
    fn from(key: &PoolKey) -> Self {
        key.pool_id()
    }
}

impl SwapParams {
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> SwapDirection {
        SwapDirection::from_zero_for_one(self.zeroForOne)
    }

    /// A negative amount specified means exact input.
    #[inline]
    #[must_use]
    pub fn is_exact_input(&self) -> bool {
        self.amountSpecified < I256::ZERO
    }
}
