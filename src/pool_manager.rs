//! ## Pool Manager
//! An in-memory host for hooks. It keeps just enough pool state to dispatch callbacks the way the
//! V4 `PoolManager` does: the swap itself is priced elsewhere and handed in as a [`SwapOutcome`].
//!
//! Every public operation is a transaction: it either completes with all hook deltas settled, or
//! leaves the manager exactly as it was.

use crate::{
    abi::{ModifyLiquidityParams, PoolKey, SwapParams},
    entities::{BalanceDelta, BeforeSwapDelta, PoolId},
    error::Error,
    hooks::{selectors, HookContext, HookWrapper, Hooks, PoolLedger, Slot0},
    utils::{is_valid_hook_address, HookFlags, HookOptions, DYNAMIC_FEE_FLAG},
};
use alloc::{boxed::Box, collections::BTreeMap};
use alloy_primitives::{Address, Bytes, FixedBytes, Sign, I256, U160, U256};
use core::any::Any;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};
use uniswap_v3_sdk::prelude::{MAX_SQRT_RATIO, MIN_SQRT_RATIO};

/// Flag a `beforeSwap` hook sets on its returned fee to override the LP fee of a dynamic-fee pool.
pub const OVERRIDE_FEE_FLAG: u32 = 0x40_0000;

/// The result of the AMM's swap step, computed outside the manager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOutcome {
    /// The pool's delta from the swapper's perspective, before any hook delta.
    pub delta: BalanceDelta,
    pub sqrt_price_x96: U160,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    /// What the swapper owes (negative) or receives (positive) after hook deltas.
    pub swapper_delta: BalanceDelta,
    pub hook_delta: BalanceDelta,
    /// The LP fee requested by a `beforeSwap` hook of a dynamic-fee pool.
    pub lp_fee_override: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolState {
    pub key: PoolKey,
    pub slot0: Slot0,
    pub liquidity: u128,
    /// Cumulative donations to the liquidity providers.
    pub donated0: U256,
    pub donated1: U256,
}

/// Everything a hook may observe or change through [`PoolLedger`].
#[derive(Clone, Debug, Default)]
pub struct LedgerState {
    block_number: u64,
    pools: BTreeMap<PoolId, PoolState>,
    claims: BTreeMap<(Address, Address), U256>,
    deltas: BTreeMap<(Address, Address), I256>,
    payouts: BTreeMap<(Address, Address), U256>,
}

#[inline]
fn to_signed(amount: U256) -> Result<I256, Error> {
    I256::checked_from_sign_and_abs(Sign::Positive, amount).ok_or(Error::Overflow)
}

impl LedgerState {
    #[inline]
    fn pool(&self, pool_id: PoolId) -> Result<&PoolState, Error> {
        self.pools
            .get(&pool_id)
            .ok_or(Error::PoolNotInitialized(pool_id))
    }

    #[inline]
    fn pool_mut(&mut self, pool_id: PoolId) -> Result<&mut PoolState, Error> {
        self.pools
            .get_mut(&pool_id)
            .ok_or(Error::PoolNotInitialized(pool_id))
    }

    /// Adds `delta` to the running balance of `account` in `currency`.
    fn account_delta(&mut self, account: Address, currency: Address, delta: I256) -> Result<(), Error> {
        if delta.is_zero() {
            return Ok(());
        }
        let entry = self.deltas.entry((account, currency)).or_default();
        *entry = entry.checked_add(delta).ok_or(Error::Overflow)?;
        if entry.is_zero() {
            self.deltas.remove(&(account, currency));
        }
        Ok(())
    }

    fn account_balance_delta(
        &mut self,
        account: Address,
        key: &PoolKey,
        delta: BalanceDelta,
    ) -> Result<(), Error> {
        self.account_delta(account, key.currency0, I256::try_from(delta.amount0).map_err(|_| Error::Overflow)?)?;
        self.account_delta(account, key.currency1, I256::try_from(delta.amount1).map_err(|_| Error::Overflow)?)
    }

    /// Fails with the first account whose deltas do not net to zero.
    fn check_settled(&self) -> Result<(), Error> {
        match self.deltas.keys().next() {
            Some(&(account, currency)) => Err(Error::CurrencyNotSettled { account, currency }),
            None => Ok(()),
        }
    }

    #[inline]
    pub fn balance_of(&self, owner: Address, currency: Address) -> U256 {
        self.payouts
            .get(&(owner, currency))
            .copied()
            .unwrap_or_default()
    }
}

impl PoolLedger for LedgerState {
    #[inline]
    fn current_block(&self) -> u64 {
        self.block_number
    }

    #[inline]
    fn slot0(&self, pool_id: PoolId) -> Result<Slot0, Error> {
        Ok(self.pool(pool_id)?.slot0)
    }

    fn donate(
        &mut self,
        account: Address,
        key: &PoolKey,
        amount0: U256,
        amount1: U256,
    ) -> Result<(), Error> {
        let pool = self.pool_mut(key.pool_id())?;
        pool.donated0 = pool.donated0.checked_add(amount0).ok_or(Error::Overflow)?;
        pool.donated1 = pool.donated1.checked_add(amount1).ok_or(Error::Overflow)?;
        self.account_delta(account, key.currency0, -to_signed(amount0)?)?;
        self.account_delta(account, key.currency1, -to_signed(amount1)?)
    }

    fn mint_claims(&mut self, account: Address, currency: Address, amount: U256) -> Result<(), Error> {
        let balance = self.claims.entry((account, currency)).or_default();
        *balance = balance.checked_add(amount).ok_or(Error::Overflow)?;
        self.account_delta(account, currency, -to_signed(amount)?)
    }

    fn burn_claims(&mut self, account: Address, currency: Address, amount: U256) -> Result<(), Error> {
        let balance = self.claims.entry((account, currency)).or_default();
        *balance = balance
            .checked_sub(amount)
            .ok_or(Error::InsufficientClaims {
                owner: account,
                currency,
            })?;
        self.account_delta(account, currency, to_signed(amount)?)
    }

    #[inline]
    fn claims_of(&self, owner: Address, currency: Address) -> U256 {
        self.claims
            .get(&(owner, currency))
            .copied()
            .unwrap_or_default()
    }

    fn take(
        &mut self,
        account: Address,
        currency: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), Error> {
        let balance = self.payouts.entry((to, currency)).or_default();
        *balance = balance.checked_add(amount).ok_or(Error::Overflow)?;
        self.account_delta(account, currency, -to_signed(amount)?)
    }
}

/// Calls the hook deployed at `address` with a context over `ledger`.
fn call_hook<R>(
    hooks: &mut BTreeMap<Address, Box<dyn Hooks>>,
    ledger: &mut LedgerState,
    address: Address,
    f: impl FnOnce(&mut dyn Hooks, &mut HookContext<'_>) -> Result<R, Error>,
) -> Result<R, Error> {
    let hook = hooks
        .get_mut(&address)
        .ok_or(Error::HookNotDeployed(address))?;
    let mut ctx = HookContext {
        hook: address,
        ledger,
    };
    f(hook.as_mut(), &mut ctx)
}

#[inline]
fn check_selector(returned: FixedBytes<4>, expected: FixedBytes<4>) -> Result<(), Error> {
    if returned != expected {
        return Err(Error::InvalidHookResponse);
    }
    Ok(())
}

#[inline]
fn downcast_mut<T: Hooks + 'static>(hook: &mut dyn Hooks) -> Option<&mut T> {
    let any: &mut dyn Any = hook.as_any_mut();
    if any.is::<T>() {
        return any.downcast_mut::<T>();
    }
    any.downcast_mut::<HookWrapper>()
        .and_then(|wrapper| wrapper.implementation_mut().as_any_mut().downcast_mut::<T>())
}

#[inline]
fn downcast_ref<T: Hooks + 'static>(hook: &dyn Hooks) -> Option<&T> {
    let any: &dyn Any = hook.as_any();
    if any.is::<T>() {
        return any.downcast_ref::<T>();
    }
    any.downcast_ref::<HookWrapper>()
        .and_then(|wrapper| wrapper.implementation().as_any().downcast_ref::<T>())
}

#[derive(Clone, Debug, Default)]
pub struct PoolManager {
    address: Address,
    ledger: LedgerState,
    hooks: BTreeMap<Address, Box<dyn Hooks>>,
}

impl PoolManager {
    #[inline]
    #[must_use]
    pub fn new(address: Address, block_number: u64) -> Self {
        Self {
            address,
            ledger: LedgerState {
                block_number,
                ..Default::default()
            },
            hooks: BTreeMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    #[inline]
    #[must_use]
    pub const fn block_number(&self) -> u64 {
        self.ledger.block_number
    }

    #[inline]
    pub fn advance_block(&mut self) -> u64 {
        self.ledger.block_number += 1;
        trace!(block = self.ledger.block_number, "block advanced");
        self.ledger.block_number
    }

    #[inline]
    #[must_use]
    pub const fn ledger(&self) -> &LedgerState {
        &self.ledger
    }

    #[inline]
    #[must_use]
    pub fn pool(&self, pool_id: PoolId) -> Option<&PoolState> {
        self.ledger.pools.get(&pool_id)
    }

    #[inline]
    #[must_use]
    pub fn is_deployed(&self, address: Address) -> bool {
        self.hooks.contains_key(&address)
    }

    /// Places a hook at `address`, whose flags must be exactly the permissions the hook declares.
    pub fn deploy_hook(&mut self, address: Address, hook: Box<dyn Hooks>) -> Result<(), Error> {
        if self.is_deployed(address) {
            return Err(Error::AddressAlreadyDeployed(address));
        }
        let flags = hook.hook_permissions().flags();
        if !flags.matches_address(address) {
            return Err(Error::AddressFlagsInvalid(address));
        }
        info!(%address, %flags, "hook deployed");
        self.hooks.insert(address, hook);
        Ok(())
    }

    /// The hook at `address`, looking through a wrapper if necessary.
    #[inline]
    #[must_use]
    pub fn hook<T: Hooks + 'static>(&self, address: Address) -> Option<&T> {
        self.hooks
            .get(&address)
            .and_then(|hook| downcast_ref::<T>(hook.as_ref()))
    }

    /// Runs `f` against the hook at `address` as its own transaction.
    pub fn call_hook<T, R>(
        &mut self,
        address: Address,
        f: impl FnOnce(&mut T, &mut HookContext<'_>) -> Result<R, Error>,
    ) -> Result<R, Error>
    where
        T: Hooks + 'static,
    {
        self.transact(|manager| {
            call_hook(&mut manager.hooks, &mut manager.ledger, address, |hook, ctx| {
                let hook = downcast_mut::<T>(hook).ok_or(Error::HookNotDeployed(address))?;
                f(hook, ctx)
            })
        })
    }

    /// Applies `f` atomically and requires every hook delta to be settled afterwards.
    pub fn transact<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R, Error>) -> Result<R, Error> {
        let snapshot = self.clone();
        let result = f(self).and_then(|value| {
            self.ledger.check_settled()?;
            Ok(value)
        });
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    #[inline]
    fn has_flag(key: &PoolKey, option: HookOptions) -> bool {
        HookFlags::from_address(key.hooks).contains(option)
    }

    /// Initializes a pool at `sqrt_price_x96`.
    pub fn initialize(
        &mut self,
        sender: Address,
        key: &PoolKey,
        sqrt_price_x96: U160,
    ) -> Result<PoolId, Error> {
        self.transact(|manager| manager.initialize_inner(sender, key, sqrt_price_x96))
    }

    fn initialize_inner(
        &mut self,
        sender: Address,
        key: &PoolKey,
        sqrt_price_x96: U160,
    ) -> Result<PoolId, Error> {
        if key.currency0 >= key.currency1 {
            return Err(Error::CurrenciesOutOfOrder);
        }
        let fee = key.lp_fee();
        if !is_valid_hook_address(key.hooks, fee) {
            return Err(Error::HookAddressNotValid(key.hooks, fee));
        }
        if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
            return Err(Error::InvalidSqrtPrice);
        }
        let pool_id = key.pool_id();
        if self.ledger.pools.contains_key(&pool_id) {
            return Err(Error::PoolAlreadyInitialized(pool_id));
        }

        if Self::has_flag(key, HookOptions::BeforeInitialize) {
            let selector = call_hook(&mut self.hooks, &mut self.ledger, key.hooks, |hook, ctx| {
                hook.before_initialize(ctx, sender, key, sqrt_price_x96)
            })?;
            check_selector(selector, selectors::before_initialize())?;
        }

        let lp_fee = if fee == DYNAMIC_FEE_FLAG { 0 } else { fee };
        self.ledger.pools.insert(
            pool_id,
            PoolState {
                key: key.clone(),
                slot0: Slot0 {
                    sqrt_price_x96,
                    lp_fee,
                },
                liquidity: 0,
                donated0: U256::ZERO,
                donated1: U256::ZERO,
            },
        );

        if Self::has_flag(key, HookOptions::AfterInitialize) {
            let selector = call_hook(&mut self.hooks, &mut self.ledger, key.hooks, |hook, ctx| {
                hook.after_initialize(ctx, sender, key, sqrt_price_x96)
            })?;
            check_selector(selector, selectors::after_initialize())?;
        }
        info!(%pool_id, hooks = %key.hooks, %sqrt_price_x96, "pool initialized");
        Ok(pool_id)
    }

    /// Adds or removes liquidity. `principal_delta` is the caller's delta as computed by the AMM.
    pub fn modify_liquidity(
        &mut self,
        sender: Address,
        key: &PoolKey,
        params: &ModifyLiquidityParams,
        principal_delta: BalanceDelta,
        hook_data: &Bytes,
    ) -> Result<BalanceDelta, Error> {
        self.transact(|manager| {
            manager.modify_liquidity_inner(sender, key, params, principal_delta, hook_data)
        })
    }

    fn modify_liquidity_inner(
        &mut self,
        sender: Address,
        key: &PoolKey,
        params: &ModifyLiquidityParams,
        principal_delta: BalanceDelta,
        hook_data: &Bytes,
    ) -> Result<BalanceDelta, Error> {
        let pool_id = key.pool_id();
        self.ledger.pool(pool_id)?;
        let liquidity_delta = i128::try_from(params.liquidityDelta).map_err(|_| Error::Overflow)?;
        let adding = liquidity_delta > 0;

        let (before, after, returns_delta) = if adding {
            (
                HookOptions::BeforeAddLiquidity,
                HookOptions::AfterAddLiquidity,
                HookOptions::AfterAddLiquidityReturnsDelta,
            )
        } else {
            (
                HookOptions::BeforeRemoveLiquidity,
                HookOptions::AfterRemoveLiquidity,
                HookOptions::AfterRemoveLiquidityReturnsDelta,
            )
        };

        if Self::has_flag(key, before) {
            let (selector, expected) =
                call_hook(&mut self.hooks, &mut self.ledger, key.hooks, |hook, ctx| {
                    if adding {
                        hook.before_add_liquidity(ctx, sender, key, params, hook_data)
                            .map(|s| (s, selectors::before_add_liquidity()))
                    } else {
                        hook.before_remove_liquidity(ctx, sender, key, params, hook_data)
                            .map(|s| (s, selectors::before_remove_liquidity()))
                    }
                })?;
            check_selector(selector, expected)?;
        }

        let pool = self.ledger.pool_mut(pool_id)?;
        pool.liquidity = if adding {
            pool.liquidity.checked_add(liquidity_delta.unsigned_abs())
        } else {
            pool.liquidity.checked_sub(liquidity_delta.unsigned_abs())
        }
        .ok_or(Error::Overflow)?;

        let mut hook_delta = BalanceDelta::ZERO;
        if Self::has_flag(key, after) {
            let (selector, expected, delta) =
                call_hook(&mut self.hooks, &mut self.ledger, key.hooks, |hook, ctx| {
                    if adding {
                        hook.after_add_liquidity(
                            ctx,
                            sender,
                            key,
                            params,
                            principal_delta,
                            BalanceDelta::ZERO,
                            hook_data,
                        )
                        .map(|(s, d)| (s, selectors::after_add_liquidity(), d))
                    } else {
                        hook.after_remove_liquidity(
                            ctx,
                            sender,
                            key,
                            params,
                            principal_delta,
                            BalanceDelta::ZERO,
                            hook_data,
                        )
                        .map(|(s, d)| (s, selectors::after_remove_liquidity(), d))
                    }
                })?;
            check_selector(selector, expected)?;
            if Self::has_flag(key, returns_delta) {
                hook_delta = delta;
            }
        }

        if !hook_delta.is_zero() {
            self.ledger
                .account_balance_delta(key.hooks, key, hook_delta)?;
        }
        let caller_delta = BalanceDelta::new(
            principal_delta
                .amount0
                .checked_sub(hook_delta.amount0)
                .ok_or(Error::Overflow)?,
            principal_delta
                .amount1
                .checked_sub(hook_delta.amount1)
                .ok_or(Error::Overflow)?,
        );
        debug!(%pool_id, liquidity_delta, ?caller_delta, "liquidity modified");
        Ok(caller_delta)
    }

    /// Swaps against a pool. The AMM's result for the swap is given as `outcome`.
    pub fn swap(
        &mut self,
        sender: Address,
        key: &PoolKey,
        params: &SwapParams,
        outcome: SwapOutcome,
        hook_data: &Bytes,
    ) -> Result<SwapReceipt, Error> {
        self.transact(|manager| manager.swap_inner(sender, key, params, outcome, hook_data))
    }

    fn swap_inner(
        &mut self,
        sender: Address,
        key: &PoolKey,
        params: &SwapParams,
        outcome: SwapOutcome,
        hook_data: &Bytes,
    ) -> Result<SwapReceipt, Error> {
        let pool_id = key.pool_id();
        self.ledger.pool(pool_id)?;
        if outcome.sqrt_price_x96 < MIN_SQRT_RATIO || outcome.sqrt_price_x96 >= MAX_SQRT_RATIO {
            return Err(Error::InvalidSqrtPrice);
        }

        let mut before_delta = BeforeSwapDelta::ZERO;
        let mut lp_fee_override = None;
        if Self::has_flag(key, HookOptions::BeforeSwap) {
            let (selector, delta, fee) =
                call_hook(&mut self.hooks, &mut self.ledger, key.hooks, |hook, ctx| {
                    hook.before_swap(ctx, sender, key, params, hook_data)
                })?;
            check_selector(selector, selectors::before_swap())?;
            if key.lp_fee() == DYNAMIC_FEE_FLAG && fee & OVERRIDE_FEE_FLAG != 0 {
                lp_fee_override = Some(fee & !OVERRIDE_FEE_FLAG);
            }
            if Self::has_flag(key, HookOptions::BeforeSwapReturnsDelta) {
                before_delta = delta;
            }
        }

        self.ledger.pool_mut(pool_id)?.slot0.sqrt_price_x96 = outcome.sqrt_price_x96;

        let mut unspecified = before_delta.unspecified;
        if Self::has_flag(key, HookOptions::AfterSwap) {
            let (selector, delta) =
                call_hook(&mut self.hooks, &mut self.ledger, key.hooks, |hook, ctx| {
                    hook.after_swap(ctx, sender, key, params, outcome.delta, hook_data)
                })?;
            check_selector(selector, selectors::after_swap())?;
            if Self::has_flag(key, HookOptions::AfterSwapReturnsDelta) {
                unspecified = unspecified.checked_add(delta).ok_or(Error::Overflow)?;
            }
        }

        // The specified currency is currency0 exactly when exact-input matches zero-for-one.
        let hook_delta = if params.is_exact_input() == params.zeroForOne {
            BalanceDelta::new(before_delta.specified, unspecified)
        } else {
            BalanceDelta::new(unspecified, before_delta.specified)
        };
        if !hook_delta.is_zero() {
            self.ledger
                .account_balance_delta(key.hooks, key, hook_delta)?;
        }
        let swapper_delta = BalanceDelta::new(
            outcome
                .delta
                .amount0
                .checked_sub(hook_delta.amount0)
                .ok_or(Error::Overflow)?,
            outcome
                .delta
                .amount1
                .checked_sub(hook_delta.amount1)
                .ok_or(Error::Overflow)?,
        );
        debug!(
            %pool_id,
            direction = %params.direction(),
            ?swapper_delta,
            ?hook_delta,
            "swap executed"
        );
        Ok(SwapReceipt {
            swapper_delta,
            hook_delta,
            lp_fee_override,
        })
    }

    /// Donates to the liquidity providers of a pool.
    pub fn donate(
        &mut self,
        sender: Address,
        key: &PoolKey,
        amount0: U256,
        amount1: U256,
        hook_data: &Bytes,
    ) -> Result<(), Error> {
        self.transact(|manager| {
            let pool_id = key.pool_id();
            manager.ledger.pool(pool_id)?;
            if Self::has_flag(key, HookOptions::BeforeDonate) {
                let selector =
                    call_hook(&mut manager.hooks, &mut manager.ledger, key.hooks, |hook, ctx| {
                        hook.before_donate(ctx, sender, key, amount0, amount1, hook_data)
                    })?;
                check_selector(selector, selectors::before_donate())?;
            }
            let pool = manager.ledger.pool_mut(pool_id)?;
            pool.donated0 = pool.donated0.checked_add(amount0).ok_or(Error::Overflow)?;
            pool.donated1 = pool.donated1.checked_add(amount1).ok_or(Error::Overflow)?;
            if Self::has_flag(key, HookOptions::AfterDonate) {
                let selector =
                    call_hook(&mut manager.hooks, &mut manager.ledger, key.hooks, |hook, ctx| {
                        hook.after_donate(ctx, sender, key, amount0, amount1, hook_data)
                    })?;
                check_selector(selector, selectors::after_donate())?;
            }
            debug!(%pool_id, %amount0, %amount1, "donated");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;
    use alloy_primitives::aliases::{I24, U24};

    fn manager() -> PoolManager {
        PoolManager::new(POOL_MANAGER_ADDRESS, 1)
    }

    fn exact_in(zero_for_one: bool, amount: i64) -> SwapParams {
        SwapParams {
            zeroForOne: zero_for_one,
            amountSpecified: I256::try_from(-amount).unwrap(),
            sqrtPriceLimitX96: U160::ZERO,
        }
    }

    mod initialize {
        use super::*;

        #[test]
        fn creates_pool() {
            let mut manager = manager();
            let pool_id = manager
                .initialize(SENDER, &USDC_DAI_KEY, *SQRT_PRICE_1_1)
                .unwrap();
            let pool = manager.pool(pool_id).unwrap();
            assert_eq!(pool.slot0.sqrt_price_x96, *SQRT_PRICE_1_1);
            assert_eq!(pool.slot0.lp_fee, 3000);
        }

        #[test]
        fn rejects_second_initialize() {
            let mut manager = manager();
            manager.initialize(SENDER, &USDC_DAI_KEY, *SQRT_PRICE_1_1).unwrap();
            assert!(matches!(
                manager.initialize(SENDER, &USDC_DAI_KEY, *SQRT_PRICE_1_1),
                Err(Error::PoolAlreadyInitialized(_))
            ));
        }

        #[test]
        fn rejects_price_out_of_bounds() {
            let mut manager = manager();
            assert!(matches!(
                manager.initialize(SENDER, &USDC_DAI_KEY, MAX_SQRT_RATIO),
                Err(Error::InvalidSqrtPrice)
            ));
            assert!(matches!(
                manager.initialize(SENDER, &USDC_DAI_KEY, U160::from(1)),
                Err(Error::InvalidSqrtPrice)
            ));
        }

        #[test]
        fn rejects_invalid_hook_address() {
            let mut manager = manager();
            let key = key_with_hooks(hook_address(HookOptions::AfterSwapReturnsDelta.flag()));
            assert!(matches!(
                manager.initialize(SENDER, &key, *SQRT_PRICE_1_1),
                Err(Error::HookAddressNotValid(..))
            ));
            assert!(manager.pool(key.pool_id()).is_none());
        }

        #[test]
        fn dynamic_fee_starts_at_zero() {
            let mut manager = manager();
            let hook = RecordingHook::new(HookOptions::BeforeInitialize.flag());
            let address = hook_address(HookOptions::BeforeInitialize.flag());
            manager.deploy_hook(address, Box::new(hook)).unwrap();
            let mut key = key_with_hooks(address);
            key.fee = U24::from(DYNAMIC_FEE_FLAG);
            let pool_id = manager.initialize(SENDER, &key, *SQRT_PRICE_1_1).unwrap();
            assert_eq!(manager.pool(pool_id).unwrap().slot0.lp_fee, 0);
            assert_eq!(
                manager.hook::<RecordingHook>(address).unwrap().calls,
                vec![HookOptions::BeforeInitialize]
            );
        }
    }

    mod dispatch {
        use super::*;

        fn setup(flags: HookFlags) -> (PoolManager, PoolKey) {
            let mut manager = manager();
            let address = hook_address(flags);
            manager
                .deploy_hook(address, Box::new(RecordingHook::new(flags)))
                .unwrap();
            let key = key_with_hooks(address);
            manager.initialize(SENDER, &key, *SQRT_PRICE_1_1).unwrap();
            (manager, key)
        }

        #[test]
        fn calls_only_flagged_callbacks() {
            let flags = HookOptions::AfterSwap.flag() | HookOptions::BeforeDonate.flag();
            let (mut manager, key) = setup(flags);
            manager
                .swap(SENDER, &key, &exact_in(true, 100), swap_outcome(-100, 99), &Bytes::new())
                .unwrap();
            manager
                .donate(SENDER, &key, U256::from(1), U256::ZERO, &Bytes::new())
                .unwrap();
            assert_eq!(
                manager.hook::<RecordingHook>(key.hooks).unwrap().calls,
                vec![HookOptions::AfterSwap, HookOptions::BeforeDonate]
            );
        }

        #[test]
        fn wrong_selector_reverts() {
            let flags = HookOptions::BeforeSwap.flag();
            let (mut manager, key) = setup(flags);
            manager
                .call_hook::<RecordingHook, _>(key.hooks, |hook, _| {
                    hook.bad_selector = true;
                    Ok(())
                })
                .unwrap();
            assert!(matches!(
                manager.swap(SENDER, &key, &exact_in(true, 100), swap_outcome(-100, 99), &Bytes::new()),
                Err(Error::InvalidHookResponse)
            ));
            assert!(manager.hook::<RecordingHook>(key.hooks).unwrap().calls.is_empty());
            assert_eq!(manager.pool(key.pool_id()).unwrap().slot0.sqrt_price_x96, *SQRT_PRICE_1_1);
        }

        #[test]
        fn delta_ignored_without_flag() {
            let flags = HookOptions::AfterSwap.flag();
            let (mut manager, key) = setup(flags);
            manager
                .call_hook::<RecordingHook, _>(key.hooks, |hook, _| {
                    hook.after_swap_delta = 5;
                    Ok(())
                })
                .unwrap();
            let receipt = manager
                .swap(SENDER, &key, &exact_in(true, 100), swap_outcome(-100, 99), &Bytes::new())
                .unwrap();
            assert!(receipt.hook_delta.is_zero());
            assert_eq!(receipt.swapper_delta, BalanceDelta::new(-100, 99));
        }

        #[test]
        fn unsettled_delta_reverts() {
            let flags = HookOptions::AfterSwap.flag() | HookOptions::AfterSwapReturnsDelta.flag();
            let (mut manager, key) = setup(flags);
            manager
                .call_hook::<RecordingHook, _>(key.hooks, |hook, _| {
                    hook.after_swap_delta = 5;
                    Ok(())
                })
                .unwrap();
            assert!(matches!(
                manager.swap(SENDER, &key, &exact_in(true, 100), swap_outcome(-100, 99), &Bytes::new()),
                Err(Error::CurrencyNotSettled { account, currency })
                    if account == key.hooks && currency == key.currency1
            ));
        }

        #[test]
        fn missing_hook_reverts() {
            let mut manager = manager();
            let key = key_with_hooks(hook_address(HookOptions::BeforeSwap.flag()));
            assert!(matches!(
                manager.initialize(SENDER, &key, *SQRT_PRICE_1_1),
                Ok(_)
            ));
            assert!(matches!(
                manager.swap(SENDER, &key, &exact_in(true, 1), swap_outcome(-1, 1), &Bytes::new()),
                Err(Error::HookNotDeployed(address)) if address == key.hooks
            ));
        }

        #[test]
        fn liquidity_callbacks_follow_sign() {
            let flags = HookOptions::BeforeAddLiquidity.flag() | HookOptions::BeforeRemoveLiquidity.flag();
            let (mut manager, key) = setup(flags);
            let mut params = ModifyLiquidityParams {
                tickLower: I24::unchecked_from(-60),
                tickUpper: I24::unchecked_from(60),
                liquidityDelta: I256::try_from(1_000).unwrap(),
                ..Default::default()
            };
            manager
                .modify_liquidity(SENDER, &key, &params, BalanceDelta::new(-10, -10), &Bytes::new())
                .unwrap();
            params.liquidityDelta = I256::try_from(-400).unwrap();
            manager
                .modify_liquidity(SENDER, &key, &params, BalanceDelta::new(4, 4), &Bytes::new())
                .unwrap();
            assert_eq!(manager.pool(key.pool_id()).unwrap().liquidity, 600);
            assert_eq!(
                manager.hook::<RecordingHook>(key.hooks).unwrap().calls,
                vec![HookOptions::BeforeAddLiquidity, HookOptions::BeforeRemoveLiquidity]
            );
            params.liquidityDelta = I256::try_from(-601).unwrap();
            assert!(matches!(
                manager.modify_liquidity(SENDER, &key, &params, BalanceDelta::ZERO, &Bytes::new()),
                Err(Error::Overflow)
            ));
        }
    }

    mod ledger {
        use super::*;

        #[test]
        fn claims_round_trip_settles() {
            let mut ledger = LedgerState::default();
            let hook = Address::repeat_byte(0x01);
            let currency = USDC_DAI_KEY.currency0;
            ledger.mint_claims(hook, currency, U256::from(10)).unwrap();
            assert!(ledger.check_settled().is_err());
            ledger.burn_claims(hook, currency, U256::from(10)).unwrap();
            ledger.check_settled().unwrap();
            assert!(matches!(
                ledger.burn_claims(hook, currency, U256::from(1)),
                Err(Error::InsufficientClaims { .. })
            ));
        }

        #[test]
        fn take_pays_recipient() {
            let mut ledger = LedgerState::default();
            let hook = Address::repeat_byte(0x01);
            let currency = USDC_DAI_KEY.currency1;
            ledger.mint_claims(hook, currency, U256::from(7)).unwrap();
            ledger.burn_claims(hook, currency, U256::from(7)).unwrap();
            ledger.take(hook, currency, CONTROLLER, U256::from(7)).unwrap();
            assert_eq!(ledger.balance_of(CONTROLLER, currency), U256::from(7));
            assert!(matches!(
                ledger.check_settled(),
                Err(Error::CurrencyNotSettled { account, .. }) if account == hook
            ));
        }
    }
}
