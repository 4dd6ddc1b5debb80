//! Test utilities and helper functions
#![cfg_attr(not(test), allow(dead_code))]

use crate::{
    abi::{ModifyLiquidityParams, PoolKey, SwapParams},
    entities::{BalanceDelta, BeforeSwapDelta},
    error::Error,
    hooks::{selectors, HookContext, Hooks},
    pool_manager::SwapOutcome,
    utils::{HookFlags, HookOptions, HookPermissions},
};
use alloc::vec::Vec;
use alloy_primitives::{
    address,
    aliases::{I24, U24},
    Address, Bytes, FixedBytes, U160, U256,
};
use once_cell::sync::Lazy;
use uniswap_sdk_core::{prelude::*, token};
use uniswap_v3_sdk::prelude::encode_sqrt_ratio_x96;

pub(crate) const POOL_MANAGER_ADDRESS: Address = address!("000000000004444c5dc75cB358380D2e3dE08A90");
pub(crate) const IMPLEMENTATION_ADDRESS: Address = address!("1111111111111111111111111111111111111111");
pub(crate) const CONTROLLER: Address = address!("00000000000000000000000000000000000000c0");
pub(crate) const STRANGER: Address = address!("00000000000000000000000000000000000000e0");
pub(crate) const SENDER: Address = address!("66a9893cC07D91D95644AEDD05D03f95e1dBA8Af");

pub(crate) static ETHER: Lazy<Ether> = Lazy::new(|| Ether::on_chain(1));

pub(crate) static USDC: Lazy<Token> = Lazy::new(|| {
    token!(
        1,
        "A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
        6,
        "USDC",
        "USD Coin"
    )
});
pub(crate) static DAI: Lazy<Token> = Lazy::new(|| {
    token!(
        1,
        "6B175474E89094C44Da98b954EedeAC495271d0F",
        18,
        "DAI",
        "DAI Stablecoin"
    )
});

pub(crate) static SQRT_PRICE_1_1: Lazy<U160> = Lazy::new(|| encode_sqrt_ratio_x96(1, 1));

pub(crate) static USDC_DAI_KEY: Lazy<PoolKey> = Lazy::new(|| key_with_hooks(Address::ZERO));

/// The DAI/USDC 0.3% pool key with `hooks` attached.
pub(crate) fn key_with_hooks(hooks: Address) -> PoolKey {
    PoolKey::from_currencies(
        &DAI.clone().into(),
        &USDC.clone().into(),
        U24::from(3000),
        I24::unchecked_from(60),
        hooks,
    )
    .unwrap()
}

/// An address carrying exactly `flags` in its low bits.
pub(crate) fn hook_address(flags: HookFlags) -> Address {
    let mut bytes = [0xaa_u8; 20];
    bytes[18] = (flags.bits() >> 8) as u8 | 0xc0;
    bytes[19] = flags.bits() as u8;
    Address::from(bytes)
}

pub(crate) fn swap_outcome(amount0: i128, amount1: i128) -> SwapOutcome {
    SwapOutcome {
        delta: BalanceDelta::new(amount0, amount1),
        sqrt_price_x96: *SQRT_PRICE_1_1,
    }
}

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Records every callback it receives and answers with the right selector unless told otherwise.
#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingHook {
    pub(crate) flags: HookFlags,
    pub(crate) calls: Vec<HookOptions>,
    pub(crate) bad_selector: bool,
    pub(crate) after_swap_delta: i128,
}

impl RecordingHook {
    pub(crate) fn new(flags: HookFlags) -> Self {
        Self {
            flags,
            ..Default::default()
        }
    }

    fn answer(&mut self, option: HookOptions, selector: FixedBytes<4>) -> FixedBytes<4> {
        self.calls.push(option);
        if self.bad_selector {
            FixedBytes::ZERO
        } else {
            selector
        }
    }
}

impl Hooks for RecordingHook {
    fn hook_permissions(&self) -> HookPermissions {
        self.flags.into()
    }

    fn before_initialize(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _sender: Address,
        _key: &PoolKey,
        _sqrt_price_x96: U160,
    ) -> Result<FixedBytes<4>, Error> {
        Ok(self.answer(HookOptions::BeforeInitialize, selectors::before_initialize()))
    }

    fn after_initialize(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _sender: Address,
        _key: &PoolKey,
        _sqrt_price_x96: U160,
    ) -> Result<FixedBytes<4>, Error> {
        Ok(self.answer(HookOptions::AfterInitialize, selectors::after_initialize()))
    }

    fn before_add_liquidity(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _sender: Address,
        _key: &PoolKey,
        _params: &ModifyLiquidityParams,
        _hook_data: &Bytes,
    ) -> Result<FixedBytes<4>, Error> {
        Ok(self.answer(HookOptions::BeforeAddLiquidity, selectors::before_add_liquidity()))
    }

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
        let selector = self.answer(HookOptions::AfterAddLiquidity, selectors::after_add_liquidity());
        Ok((selector, BalanceDelta::ZERO))
    }

    fn before_remove_liquidity(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _sender: Address,
        _key: &PoolKey,
        _params: &ModifyLiquidityParams,
        _hook_data: &Bytes,
    ) -> Result<FixedBytes<4>, Error> {
        Ok(self.answer(
            HookOptions::BeforeRemoveLiquidity,
            selectors::before_remove_liquidity(),
        ))
    }

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
        let selector = self.answer(
            HookOptions::AfterRemoveLiquidity,
            selectors::after_remove_liquidity(),
        );
        Ok((selector, BalanceDelta::ZERO))
    }

    fn before_swap(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _sender: Address,
        _key: &PoolKey,
        _params: &SwapParams,
        _hook_data: &Bytes,
    ) -> Result<(FixedBytes<4>, BeforeSwapDelta, u32), Error> {
        let selector = self.answer(HookOptions::BeforeSwap, selectors::before_swap());
        Ok((selector, BeforeSwapDelta::ZERO, 0))
    }

    fn after_swap(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _sender: Address,
        _key: &PoolKey,
        _params: &SwapParams,
        _delta: BalanceDelta,
        _hook_data: &Bytes,
    ) -> Result<(FixedBytes<4>, i128), Error> {
        let selector = self.answer(HookOptions::AfterSwap, selectors::after_swap());
        Ok((selector, self.after_swap_delta))
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
        Ok(self.answer(HookOptions::BeforeDonate, selectors::before_donate()))
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
        Ok(self.answer(HookOptions::AfterDonate, selectors::after_donate()))
    }
}
