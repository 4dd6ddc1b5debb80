use alloy_primitives::{I256, U256};
use serde::{Deserialize, Serialize};

const LOWER_128_MASK: U256 = U256::from_limbs([u64::MAX, u64::MAX, 0, 0]);

#[inline]
fn pack(upper: i128, lower: i128) -> I256 {
    let raw = (U256::from(upper as u128) << 128_usize) | U256::from(lower as u128);
    I256::from_raw(raw)
}

#[inline]
fn unpack(value: I256) -> (i128, i128) {
    let raw = value.into_raw();
    let upper = (raw >> 128_usize).to::<u128>() as i128;
    let lower = (raw & LOWER_128_MASK).to::<u128>() as i128;
    (upper, lower)
}

/// Two signed 128-bit amounts, from the perspective of the caller: negative means owed to the
/// pool, positive means owed by the pool. Packed into an `int256` with `amount0` in the upper half.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BalanceDelta {
    pub amount0: i128,
    pub amount1: i128,
}

impl BalanceDelta {
    pub const ZERO: Self = Self {
        amount0: 0,
        amount1: 0,
    };

    #[inline]
    #[must_use]
    pub const fn new(amount0: i128, amount1: i128) -> Self {
        Self { amount0, amount1 }
    }

    #[inline]
    #[must_use]
    pub fn from_packed(value: I256) -> Self {
        let (amount0, amount1) = unpack(value);
        Self { amount0, amount1 }
    }

    #[inline]
    #[must_use]
    pub fn packed(&self) -> I256 {
        pack(self.amount0, self.amount1)
    }

    #[inline]
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.amount0 == 0 && self.amount1 == 0
    }
}

/// The delta a hook returns from `beforeSwap`: `specified` in the upper half, `unspecified` in the
/// lower half.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BeforeSwapDelta {
    pub specified: i128,
    pub unspecified: i128,
}

impl BeforeSwapDelta {
    pub const ZERO: Self = Self {
        specified: 0,
        unspecified: 0,
    };

    #[inline]
    #[must_use]
    pub fn from_packed(value: I256) -> Self {
        let (specified, unspecified) = unpack(value);
        Self {
            specified,
            unspecified,
        }
    }

    #[inline]
    #[must_use]
    pub fn packed(&self) -> I256 {
        pack(self.specified, self.unspecified)
    }

    #[inline]
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.specified == 0 && self.unspecified == 0
    }
}
