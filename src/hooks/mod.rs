//! ## Hooks
//! Hook contracts are modelled as Rust objects implementing [`Hooks`]. The pool manager calls a
//! callback only when the hook address carries the matching flag, and every callback must answer
//! with its own selector.

mod ledger;
mod swap_guard;
mod wrapper;

pub use ledger::*;
pub use swap_guard::*;
pub use wrapper::*;

use crate::{
    abi::{IHooks, ModifyLiquidityParams, PoolKey, SwapParams},
    entities::{BalanceDelta, BeforeSwapDelta},
    error::Error,
    utils::HookPermissions,
};
use alloc::boxed::Box;
use alloy_primitives::{Address, Bytes, FixedBytes, U160, U256};
use alloy_sol_types::SolCall;
use core::{any::Any, fmt::Debug};

/// The execution context handed to a hook callback.
pub struct HookContext<'a> {
    /// The address the pool manager called, i.e. the account hook deltas are attributed to.
    pub hook: Address,
    pub ledger: &'a mut dyn PoolLedger,
}

impl Debug for HookContext<'_> {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HookContext")
            .field("hook", &self.hook)
            .field("block", &self.ledger.current_block())
            .finish()
    }
}

/// Returns the `IHooks` selector of the call type `C`.
#[inline]
#[must_use]
pub fn selector<C: SolCall>() -> FixedBytes<4> {
    FixedBytes(C::SELECTOR)
}

/// A Uniswap V4 hook. Callbacks the hook does not declare in [`Hooks::hook_permissions`] keep the
/// default implementation, which fails with [`Error::HookNotImplemented`].
pub trait Hooks: HooksClone + Debug {
    /// The callbacks this hook implements, as it reports them about itself.
    fn hook_permissions(&self) -> HookPermissions;

    fn before_initialize(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _sender: Address,
        _key: &PoolKey,
        _sqrt_price_x96: U160,
    ) -> Result<FixedBytes<4>, Error> {
        Err(Error::HookNotImplemented)
    }

    fn after_initialize(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _sender: Address,
        _key: &PoolKey,
        _sqrt_price_x96: U160,
    ) -> Result<FixedBytes<4>, Error> {
        Err(Error::HookNotImplemented)
    }

    fn before_add_liquidity(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _sender: Address,
        _key: &PoolKey,
        _params: &ModifyLiquidityParams,
        _hook_data: &Bytes,
    ) -> Result<FixedBytes<4>, Error> {
        Err(Error::HookNotImplemented)
    }

    #[allow(clippy::too_many_arguments)]
    fn after_add_liquidity(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _sender: Address,
        _key: &PoolKey,
        _params: &ModifyLiquidityParams,
        _delta: BalanceDelta,
        _fees_accrued: BalanceDelta,
        _hook_data: &Bytes,
    ) -> Result<(FixedBytes<4>, BalanceDelta), Error> {
        Err(Error::HookNotImplemented)
    }

    fn before_remove_liquidity(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _sender: Address,
        _key: &PoolKey,
        _params: &ModifyLiquidityParams,
        _hook_data: &Bytes,
    ) -> Result<FixedBytes<4>, Error> {
        Err(Error::HookNotImplemented)
    }

    #[allow(clippy::too_many_arguments)]
    fn after_remove_liquidity(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _sender: Address,
        _key: &PoolKey,
        _params: &ModifyLiquidityParams,
        _delta: BalanceDelta,
        _fees_accrued: BalanceDelta,
        _hook_data: &Bytes,
    ) -> Result<(FixedBytes<4>, BalanceDelta), Error> {
        Err(Error::HookNotImplemented)
    }

    /// Returns the selector, a delta in (specified, unspecified) order and an LP fee override.
    fn before_swap(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _sender: Address,
        _key: &PoolKey,
        _params: &SwapParams,
        _hook_data: &Bytes,
    ) -> Result<(FixedBytes<4>, BeforeSwapDelta, u32), Error> {
        Err(Error::HookNotImplemented)
    }

    /// Returns the selector and a delta in the unspecified currency.
    fn after_swap(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _sender: Address,
        _key: &PoolKey,
        _params: &SwapParams,
        _delta: BalanceDelta,
        _hook_data: &Bytes,
    ) -> Result<(FixedBytes<4>, i128), Error> {
        Err(Error::HookNotImplemented)
    }

    fn before_donate(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _sender: Address,
        _key: &PoolKey,
        _amount0: U256,
        _amount1: U256,
        _hook_data: &Bytes,
    ) -> Result<FixedBytes<4>, Error> {
        Err(Error::HookNotImplemented)
    }

    fn after_donate(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _sender: Address,
        _key: &PoolKey,
        _amount0: U256,
        _amount1: U256,
        _hook_data: &Bytes,
    ) -> Result<FixedBytes<4>, Error> {
        Err(Error::HookNotImplemented)
    }
}

/// Object-safe cloning and downcasting for boxed hooks.
pub trait HooksClone {
    fn clone_box(&self) -> Box<dyn Hooks>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> HooksClone for T
where
    T: Hooks + Clone + 'static,
{
    #[inline]
    fn clone_box(&self) -> Box<dyn Hooks> {
        Box::new(self.clone())
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Clone for Box<dyn Hooks> {
    #[inline]
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Selectors every callback must answer with.
pub mod selectors {
    use super::*;

    #[inline]
    #[must_use]
    pub fn before_initialize() -> FixedBytes<4> {
        selector::<IHooks::beforeInitializeCall>()
    }

    #[inline]
    #[must_use]
    pub fn after_initialize() -> FixedBytes<4> {
        selector::<IHooks::afterInitializeCall>()
    }

    #[inline]
    #[must_use]
    pub fn before_add_liquidity() -> FixedBytes<4> {
        selector::<IHooks::beforeAddLiquidityCall>()
    }

    #[inline]
    #[must_use]
    pub fn after_add_liquidity() -> FixedBytes<4> {
        selector::<IHooks::afterAddLiquidityCall>()
    }

    #[inline]
    #[must_use]
    pub fn before_remove_liquidity() -> FixedBytes<4> {
        selector::<IHooks::beforeRemoveLiquidityCall>()
    }

    #[inline]
    #[must_use]
    pub fn after_remove_liquidity() -> FixedBytes<4> {
        selector::<IHooks::afterRemoveLiquidityCall>()
    }

    #[inline]
    #[must_use]
    pub fn before_swap() -> FixedBytes<4> {
        selector::<IHooks::beforeSwapCall>()
    }

    #[inline]
    #[must_use]
    pub fn after_swap() -> FixedBytes<4> {
        selector::<IHooks::afterSwapCall>()
    }

    #[inline]
    #[must_use]
    pub fn before_donate() -> FixedBytes<4> {
        selector::<IHooks::beforeDonateCall>()
    }

    #[inline]
    #[must_use]
    pub fn after_donate() -> FixedBytes<4> {
        selector::<IHooks::afterDonateCall>()
    }
}
