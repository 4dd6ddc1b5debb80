//! ## Swap Guard
//! A hook that allows at most one swap per direction, per pool and per block, and skims the
//! implicit fee of exact-input swaps. The fee is split between a donation to the pool and claims
//! retained by the hook, which only the controller can withdraw.

use super::{selectors, HookContext, Hooks};
use crate::{
    abi::{PoolKey, SwapParams},
    entities::{BalanceDelta, BeforeSwapDelta, PoolId, SwapDirection},
    error::Error,
    utils::{implicit_fee, validate_protocol_fee_bips, FeeSplit, HookPermissions, MIN_PROTOCOL_FEE_BIPS},
};
use alloc::collections::BTreeMap;
use alloy_primitives::{Address, Bytes, FixedBytes, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// The currency the implicit fee is taken in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeCurrency {
    /// Always `currency1`. One-for-zero swaps then leave the hook unsettled and revert.
    #[default]
    AlwaysCurrency1,
    /// The output currency of the swap, which is also the unspecified currency of an exact-input
    /// swap.
    Output,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub controller: Address,
    pub protocol_fee_bips: u16,
    pub fee_currency: FeeCurrency,
}

impl Default for GuardConfig {
    #[inline]
    fn default() -> Self {
        Self {
            controller: Address::ZERO,
            protocol_fee_bips: MIN_PROTOCOL_FEE_BIPS,
            fee_currency: FeeCurrency::AlwaysCurrency1,
        }
    }
}

/// Read-only view of the guard's state for one pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardPoolState {
    pub last_forward_block: Option<u64>,
    pub last_reverse_block: Option<u64>,
    pub protocol_fee_bips: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct LastSwapBlocks {
    forward: Option<u64>,
    reverse: Option<u64>,
}

impl LastSwapBlocks {
    #[inline]
    fn slot(&mut self, direction: SwapDirection) -> &mut Option<u64> {
        match direction {
            SwapDirection::ZeroForOne => &mut self.forward,
            SwapDirection::OneForZero => &mut self.reverse,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SwapGuardHook {
    controller: Address,
    protocol_fee_bips: u16,
    fee_currency: FeeCurrency,
    last_swap_blocks: BTreeMap<PoolId, LastSwapBlocks>,
}

impl SwapGuardHook {
    #[inline]
    pub fn new(config: GuardConfig) -> Result<Self, Error> {
        Ok(Self {
            controller: config.controller,
            protocol_fee_bips: validate_protocol_fee_bips(config.protocol_fee_bips)?,
            fee_currency: config.fee_currency,
            last_swap_blocks: BTreeMap::new(),
        })
    }

    #[inline]
    #[must_use]
    pub const fn controller(&self) -> Address {
        self.controller
    }

    #[inline]
    #[must_use]
    pub const fn protocol_fee_bips(&self) -> u16 {
        self.protocol_fee_bips
    }

    #[inline]
    #[must_use]
    pub const fn fee_currency(&self) -> FeeCurrency {
        self.fee_currency
    }

    #[inline]
    #[must_use]
    pub fn pool_state(&self, pool_id: PoolId) -> GuardPoolState {
        let blocks = self
            .last_swap_blocks
            .get(&pool_id)
            .copied()
            .unwrap_or_default();
        GuardPoolState {
            last_forward_block: blocks.forward,
            last_reverse_block: blocks.reverse,
            protocol_fee_bips: self.protocol_fee_bips,
        }
    }

    #[inline]
    fn ensure_controller(&self, caller: Address) -> Result<(), Error> {
        if caller != self.controller {
            return Err(Error::Unauthorized(caller));
        }
        Ok(())
    }

    /// Sets the share of the implicit fee the protocol retains, in basis points.
    #[inline]
    pub fn set_protocol_fee_bips(&mut self, caller: Address, bips: u16) -> Result<(), Error> {
        self.ensure_controller(caller)?;
        self.protocol_fee_bips = validate_protocol_fee_bips(bips)?;
        info!(bips, "protocol fee updated");
        Ok(())
    }

    /// Burns retained claims and pays them out to `recipient`.
    ///
    /// ## Arguments
    ///
    /// * `ctx`: The hook's context, whose `hook` account holds the claims
    /// * `caller`: Must be the controller
    /// * `currency`: The currency to withdraw
    /// * `recipient`: The receiver of the funds
    /// * `amount`: The amount to withdraw
    #[inline]
    pub fn withdraw(
        &mut self,
        ctx: &mut HookContext<'_>,
        caller: Address,
        currency: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<(), Error> {
        self.ensure_controller(caller)?;
        ctx.ledger.burn_claims(ctx.hook, currency, amount)?;
        ctx.ledger.take(ctx.hook, currency, recipient, amount)?;
        info!(%currency, %recipient, %amount, "retained fees withdrawn");
        Ok(())
    }

    /// The currency the fee of a swap in `direction` is taken in.
    #[inline]
    #[must_use]
    pub const fn fee_currency_of(&self, key: &PoolKey, direction: SwapDirection) -> Address {
        match (self.fee_currency, direction) {
            (FeeCurrency::Output, SwapDirection::ZeroForOne) | (FeeCurrency::AlwaysCurrency1, _) => {
                key.currency1
            }
            (FeeCurrency::Output, SwapDirection::OneForZero) => key.currency0,
        }
    }
}

impl Hooks for SwapGuardHook {
    #[inline]
    fn hook_permissions(&self) -> HookPermissions {
        HookPermissions {
            before_swap: true,
            after_swap: true,
            after_swap_returns_delta: true,
            ..Default::default()
        }
    }

    fn before_swap(
        &mut self,
        ctx: &mut HookContext<'_>,
        _sender: Address,
        key: &PoolKey,
        params: &SwapParams,
        _hook_data: &Bytes,
    ) -> Result<(FixedBytes<4>, BeforeSwapDelta, u32), Error> {
        let pool_id = key.pool_id();
        let direction = params.direction();
        let block = ctx.ledger.current_block();
        let last = self
            .last_swap_blocks
            .entry(pool_id)
            .or_default()
            .slot(direction);
        if *last == Some(block) {
            debug!(%pool_id, %direction, block, "direction already used in this block");
            return Err(Error::DirectionAlreadyUsedThisBlock(direction));
        }
        *last = Some(block);
        trace!(%pool_id, %direction, block, "swap direction recorded");
        Ok((selectors::before_swap(), BeforeSwapDelta::ZERO, 0))
    }

    fn after_swap(
        &mut self,
        ctx: &mut HookContext<'_>,
        _sender: Address,
        key: &PoolKey,
        params: &SwapParams,
        delta: BalanceDelta,
        _hook_data: &Bytes,
    ) -> Result<(FixedBytes<4>, i128), Error> {
        if !params.is_exact_input() {
            return Ok((selectors::after_swap(), 0));
        }
        let direction = params.direction();
        // A swap stopped by its price limit spends less than `amountSpecified`.
        let (amount_in, amount_out) = match direction {
            SwapDirection::ZeroForOne => (delta.amount0, delta.amount1),
            SwapDirection::OneForZero => (delta.amount1, delta.amount0),
        };
        if amount_in >= 0 || amount_out <= 0 {
            return Ok((selectors::after_swap(), 0));
        }
        let pool_id = key.pool_id();
        let sqrt_price_x96 = ctx.ledger.slot0(pool_id)?.sqrt_price_x96;
        let fee = implicit_fee(
            direction,
            U256::from(amount_in.unsigned_abs()),
            U256::from(amount_out.unsigned_abs()),
            sqrt_price_x96,
        )?;
        if fee.is_zero() {
            return Ok((selectors::after_swap(), 0));
        }

        let split = FeeSplit::new(fee, self.protocol_fee_bips)?;
        let currency = self.fee_currency_of(key, direction);
        let (amount0, amount1) = if currency == key.currency0 {
            (split.redistributed, U256::ZERO)
        } else {
            (U256::ZERO, split.redistributed)
        };
        if !split.redistributed.is_zero() {
            ctx.ledger.donate(ctx.hook, key, amount0, amount1)?;
        }
        ctx.ledger.mint_claims(ctx.hook, currency, split.retained)?;
        debug!(
            %pool_id,
            %direction,
            %fee,
            redistributed = %split.redistributed,
            retained = %split.retained,
            "implicit fee extracted"
        );

        let fee: u128 = fee.try_into().map_err(|_| Error::Overflow)?;
        let fee = i128::try_from(fee).map_err(|_| Error::Overflow)?;
        Ok((selectors::after_swap(), fee))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    fn guard() -> SwapGuardHook {
        SwapGuardHook::new(GuardConfig {
            controller: CONTROLLER,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_permissions() {
        let flags = guard().hook_permissions().flags();
        assert!(flags.is_valid());
        assert_eq!(flags.bits(), 0x00C4);
    }

    #[test]
    fn test_new_rejects_low_bips() {
        assert!(matches!(
            SwapGuardHook::new(GuardConfig {
                protocol_fee_bips: 999,
                ..Default::default()
            }),
            Err(Error::InvalidProtocolFeeBips(999))
        ));
    }

    #[test]
    fn test_set_protocol_fee_bips() {
        let mut guard = guard();
        assert!(matches!(
            guard.set_protocol_fee_bips(STRANGER, 2_000),
            Err(Error::Unauthorized(caller)) if caller == STRANGER
        ));
        assert!(matches!(
            guard.set_protocol_fee_bips(CONTROLLER, 500),
            Err(Error::InvalidProtocolFeeBips(500))
        ));
        assert_eq!(guard.protocol_fee_bips(), MIN_PROTOCOL_FEE_BIPS);
        guard.set_protocol_fee_bips(CONTROLLER, 2_500).unwrap();
        assert_eq!(guard.protocol_fee_bips(), 2_500);
    }

    #[test]
    fn test_pool_state_defaults() {
        let state = guard().pool_state(USDC_DAI_KEY.pool_id());
        assert_eq!(
            state,
            GuardPoolState {
                last_forward_block: None,
                last_reverse_block: None,
                protocol_fee_bips: MIN_PROTOCOL_FEE_BIPS,
            }
        );
    }

    #[test]
    fn test_fee_currency_of() {
        let mut guard = guard();
        let key = USDC_DAI_KEY.clone();
        assert_eq!(guard.fee_currency(), FeeCurrency::AlwaysCurrency1);
        assert_eq!(guard.fee_currency_of(&key, SwapDirection::ZeroForOne), key.currency1);
        assert_eq!(guard.fee_currency_of(&key, SwapDirection::OneForZero), key.currency1);
        guard.fee_currency = FeeCurrency::Output;
        assert_eq!(guard.fee_currency_of(&key, SwapDirection::ZeroForOne), key.currency1);
        assert_eq!(guard.fee_currency_of(&key, SwapDirection::OneForZero), key.currency0);
    }
}
