//! ## Hook Wrapper
//! A wrapper sits at a mined address and forwards callbacks to an implementation hook. The
//! wrapper's capabilities decide which of the implementation's callbacks and deltas may be
//! forwarded at all, and the address must advertise exactly the forwardable subset.

use super::{HookContext, Hooks};
use crate::{
    abi::{ModifyLiquidityParams, PoolKey, SwapParams, WrapperConstructorArgs},
    entities::{BalanceDelta, BeforeSwapDelta},
    error::Error,
    utils::{HookFlags, HookOptions, HookPermissions},
};
use alloc::{boxed::Box, vec::Vec};
use alloy_primitives::{Address, Bytes, FixedBytes, U160, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The callbacks and deltas a wrapper is able to forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WrapperCapabilities {
    pub forwarded_callbacks: HookFlags,
    pub forwarded_deltas: HookFlags,
}

impl Default for WrapperCapabilities {
    #[inline]
    fn default() -> Self {
        Self::protective()
    }
}

impl WrapperCapabilities {
    /// Bits outside the respective masks are dropped.
    #[inline]
    #[must_use]
    pub const fn new(forwarded_callbacks: HookFlags, forwarded_deltas: HookFlags) -> Self {
        Self {
            forwarded_callbacks: forwarded_callbacks.base(),
            forwarded_deltas: forwarded_deltas.deltas(),
        }
    }

    /// Forwards every lifecycle callback but never a delta.
    #[inline]
    #[must_use]
    pub const fn protective() -> Self {
        Self::new(HookFlags::BASE_MASK, HookFlags::NONE)
    }

    #[inline]
    #[must_use]
    pub const fn full() -> Self {
        Self::new(HookFlags::BASE_MASK, HookFlags::DELTA_MASK)
    }

    /// The flags a wrapper around an implementation declaring `implementation_flags` must carry.
    #[inline]
    #[must_use]
    pub fn expected_flags(&self, implementation_flags: HookFlags) -> HookFlags {
        (implementation_flags.base() & self.forwarded_callbacks)
            | (implementation_flags.deltas() & self.forwarded_deltas)
    }

    /// ABI-encoded constructor arguments of a wrapper with these capabilities.
    #[inline]
    #[must_use]
    pub fn constructor_args(&self, pool_manager: Address, implementation: Address) -> Vec<u8> {
        WrapperConstructorArgs {
            poolManager: pool_manager,
            implementation,
            forwardedCallbacks: self.forwarded_callbacks.bits(),
            forwardedDeltas: self.forwarded_deltas.bits(),
        }
        .abi_encode()
    }
}

/// Checks a wrapper address against the flags its implementation declares. Flag sets with a delta
/// modifier but no base callback are rejected before the address is looked at.
///
/// ## Arguments
///
/// * `address`: The wrapper address
/// * `implementation_flags`: The flags the implementation reports about itself
/// * `capabilities`: What the wrapper is able to forward
#[inline]
pub fn validate_hook_permissions(
    address: Address,
    implementation_flags: HookFlags,
    capabilities: &WrapperCapabilities,
) -> Result<(), Error> {
    if !implementation_flags.is_valid() {
        return Err(Error::InvalidHookFlags(implementation_flags));
    }
    let expected = capabilities.expected_flags(implementation_flags);
    if !expected.is_valid() {
        return Err(Error::InvalidHookFlags(expected));
    }
    if HookFlags::from_address(address) != expected {
        return Err(Error::AddressFlagsInvalid(address));
    }
    if !(implementation_flags.deltas() & !capabilities.forwarded_deltas).is_empty() {
        return Err(Error::PermissionForbidden(address));
    }
    Ok(())
}

/// A deployed wrapper. Constructing one runs [`validate_hook_permissions`], so a value of this
/// type always sits at a valid address.
#[derive(Clone, Debug)]
pub struct HookWrapper {
    address: Address,
    implementation_address: Address,
    capabilities: WrapperCapabilities,
    implementation: Box<dyn Hooks>,
}

impl HookWrapper {
    #[inline]
    pub fn new(
        address: Address,
        implementation_address: Address,
        implementation: Box<dyn Hooks>,
        capabilities: WrapperCapabilities,
    ) -> Result<Self, Error> {
        let implementation_flags = implementation.hook_permissions().flags();
        validate_hook_permissions(address, implementation_flags, &capabilities)?;
        debug!(%address, %implementation_address, %implementation_flags, "hook wrapper validated");
        Ok(Self {
            address,
            implementation_address,
            capabilities,
            implementation,
        })
    }

    #[inline]
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    #[inline]
    #[must_use]
    pub const fn implementation_address(&self) -> Address {
        self.implementation_address
    }

    #[inline]
    #[must_use]
    pub const fn capabilities(&self) -> &WrapperCapabilities {
        &self.capabilities
    }

    #[inline]
    #[must_use]
    pub fn implementation(&self) -> &dyn Hooks {
        self.implementation.as_ref()
    }

    #[inline]
    pub fn implementation_mut(&mut self) -> &mut dyn Hooks {
        self.implementation.as_mut()
    }

    #[inline]
    fn forwards(&self, option: HookOptions) -> Result<(), Error> {
        if HookFlags::from_address(self.address).contains(option) {
            Ok(())
        } else {
            Err(Error::HookNotImplemented)
        }
    }
}

impl Hooks for HookWrapper {
    /// The permissions encoded in the wrapper address.
    #[inline]
    fn hook_permissions(&self) -> HookPermissions {
        HookFlags::from_address(self.address).into()
    }

    fn before_initialize(
        &mut self,
        ctx: &mut HookContext<'_>,
        sender: Address,
        key: &PoolKey,
        sqrt_price_x96: U160,
    ) -> Result<FixedBytes<4>, Error> {
        self.forwards(HookOptions::BeforeInitialize)?;
        self.implementation
            .before_initialize(ctx, sender, key, sqrt_price_x96)
    }

    fn after_initialize(
        &mut self,
        ctx: &mut HookContext<'_>,
        sender: Address,
        key: &PoolKey,
        sqrt_price_x96: U160,
    ) -> Result<FixedBytes<4>, Error> {
        self.forwards(HookOptions::AfterInitialize)?;
        self.implementation
            .after_initialize(ctx, sender, key, sqrt_price_x96)
    }

    fn before_add_liquidity(
        &mut self,
        ctx: &mut HookContext<'_>,
        sender: Address,
        key: &PoolKey,
        params: &ModifyLiquidityParams,
        hook_data: &Bytes,
    ) -> Result<FixedBytes<4>, Error> {
        self.forwards(HookOptions::BeforeAddLiquidity)?;
        self.implementation
            .before_add_liquidity(ctx, sender, key, params, hook_data)
    }

    fn after_add_liquidity(
        &mut self,
        ctx: &mut HookContext<'_>,
        sender: Address,
        key: &PoolKey,
        params: &ModifyLiquidityParams,
        delta: BalanceDelta,
        fees_accrued: BalanceDelta,
        hook_data: &Bytes,
    ) -> Result<(FixedBytes<4>, BalanceDelta), Error> {
        self.forwards(HookOptions::AfterAddLiquidity)?;
        self.implementation
            .after_add_liquidity(ctx, sender, key, params, delta, fees_accrued, hook_data)
    }

    fn before_remove_liquidity(
        &mut self,
        ctx: &mut HookContext<'_>,
        sender: Address,
        key: &PoolKey,
        params: &ModifyLiquidityParams,
        hook_data: &Bytes,
    ) -> Result<FixedBytes<4>, Error> {
        self.forwards(HookOptions::BeforeRemoveLiquidity)?;
        self.implementation
            .before_remove_liquidity(ctx, sender, key, params, hook_data)
    }

    fn after_remove_liquidity(
        &mut self,
        ctx: &mut HookContext<'_>,
        sender: Address,
        key: &PoolKey,
        params: &ModifyLiquidityParams,
        delta: BalanceDelta,
        fees_accrued: BalanceDelta,
        hook_data: &Bytes,
    ) -> Result<(FixedBytes<4>, BalanceDelta), Error> {
        self.forwards(HookOptions::AfterRemoveLiquidity)?;
        self.implementation
            .after_remove_liquidity(ctx, sender, key, params, delta, fees_accrued, hook_data)
    }

    fn before_swap(
        &mut self,
        ctx: &mut HookContext<'_>,
        sender: Address,
        key: &PoolKey,
        params: &SwapParams,
        hook_data: &Bytes,
    ) -> Result<(FixedBytes<4>, BeforeSwapDelta, u32), Error> {
        self.forwards(HookOptions::BeforeSwap)?;
        self.implementation
            .before_swap(ctx, sender, key, params, hook_data)
    }

    fn after_swap(
        &mut self,
        ctx: &mut HookContext<'_>,
        sender: Address,
        key: &PoolKey,
        params: &SwapParams,
        delta: BalanceDelta,
        hook_data: &Bytes,
    ) -> Result<(FixedBytes<4>, i128), Error> {
        self.forwards(HookOptions::AfterSwap)?;
        self.implementation
            .after_swap(ctx, sender, key, params, delta, hook_data)
    }

    fn before_donate(
        &mut self,
        ctx: &mut HookContext<'_>,
        sender: Address,
        key: &PoolKey,
        amount0: U256,
        amount1: U256,
        hook_data: &Bytes,
    ) -> Result<FixedBytes<4>, Error> {
        self.forwards(HookOptions::BeforeDonate)?;
        self.implementation
            .before_donate(ctx, sender, key, amount0, amount1, hook_data)
    }

    fn after_donate(
        &mut self,
        ctx: &mut HookContext<'_>,
        sender: Address,
        key: &PoolKey,
        amount0: U256,
        amount1: U256,
        hook_data: &Bytes,
    ) -> Result<FixedBytes<4>, Error> {
        self.forwards(HookOptions::AfterDonate)?;
        self.implementation
            .after_donate(ctx, sender, key, amount0, amount1, hook_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;
    use proptest::prelude::*;

    fn address_with(flags: HookFlags) -> Address {
        let mut bytes = [0x11_u8; 20];
        bytes[18] = (flags.bits() >> 8) as u8;
        bytes[19] = flags.bits() as u8;
        Address::from(bytes)
    }

    fn swap_flags() -> HookFlags {
        HookFlags::from_options(&[HookOptions::BeforeSwap, HookOptions::AfterSwap])
    }

    fn swap_delta_flags() -> HookFlags {
        swap_flags() | HookOptions::AfterSwapReturnsDelta.flag()
    }

    mod validate {
        use super::*;

        #[test]
        fn accepts_exact_flags() {
            let caps = WrapperCapabilities::protective();
            assert!(validate_hook_permissions(address_with(swap_flags()), swap_flags(), &caps).is_ok());
        }

        #[test]
        fn rejects_extra_address_bits() {
            let caps = WrapperCapabilities::protective();
            let address = address_with(swap_flags() | HookOptions::BeforeDonate.flag());
            assert!(matches!(
                validate_hook_permissions(address, swap_flags(), &caps),
                Err(Error::AddressFlagsInvalid(a)) if a == address
            ));
        }

        #[test]
        fn rejects_missing_address_bits() {
            let caps = WrapperCapabilities::protective();
            let address = address_with(HookOptions::BeforeSwap.flag());
            assert!(matches!(
                validate_hook_permissions(address, swap_flags(), &caps),
                Err(Error::AddressFlagsInvalid(_))
            ));
        }

        #[test]
        fn forbids_unforwarded_delta() {
            // Address matches the forwardable subset, but the delta itself cannot be forwarded.
            let caps = WrapperCapabilities::protective();
            let address = address_with(swap_flags());
            assert!(matches!(
                validate_hook_permissions(address, swap_delta_flags(), &caps),
                Err(Error::PermissionForbidden(a)) if a == address
            ));
        }

        #[test]
        fn flag_mismatch_takes_precedence() {
            let caps = WrapperCapabilities::protective();
            let address = address_with(swap_delta_flags());
            assert!(matches!(
                validate_hook_permissions(address, swap_delta_flags(), &caps),
                Err(Error::AddressFlagsInvalid(_))
            ));
        }

        #[test]
        fn full_capabilities_forward_delta() {
            let caps = WrapperCapabilities::full();
            assert!(
                validate_hook_permissions(address_with(swap_delta_flags()), swap_delta_flags(), &caps)
                    .is_ok()
            );
        }

        #[test]
        fn rejects_delta_without_base_callback() {
            let caps = WrapperCapabilities::full();
            let implementation_flags = HookOptions::AfterSwapReturnsDelta.flag();
            let address = address_with(implementation_flags);
            assert!(matches!(
                validate_hook_permissions(address, implementation_flags, &caps),
                Err(Error::InvalidHookFlags(f)) if f == implementation_flags
            ));
        }

        #[test]
        fn rejects_delta_whose_callback_is_not_forwarded() {
            let caps = WrapperCapabilities::new(HookOptions::BeforeSwap.flag(), HookFlags::DELTA_MASK);
            let expected = HookOptions::AfterSwapReturnsDelta.flag();
            assert!(matches!(
                validate_hook_permissions(address_with(expected), swap_delta_flags(), &caps),
                Err(Error::InvalidHookFlags(f)) if f == expected
            ));
        }

        #[test]
        fn unforwarded_callback_is_masked_out() {
            let caps = WrapperCapabilities::new(HookOptions::BeforeSwap.flag(), HookFlags::NONE);
            let address = address_with(HookOptions::BeforeSwap.flag());
            assert!(validate_hook_permissions(address, swap_flags(), &caps).is_ok());
        }
    }

    mod wrapper {
        use super::*;

        #[test]
        fn construction_validates() {
            let implementation = Box::new(RecordingHook::new(swap_delta_flags()));
            assert!(matches!(
                HookWrapper::new(
                    address_with(swap_flags()),
                    IMPLEMENTATION_ADDRESS,
                    implementation,
                    WrapperCapabilities::protective()
                ),
                Err(Error::PermissionForbidden(_))
            ));
        }

        #[test]
        fn permissions_come_from_address() {
            let wrapper = HookWrapper::new(
                address_with(HookOptions::BeforeSwap.flag()),
                IMPLEMENTATION_ADDRESS,
                Box::new(RecordingHook::new(swap_flags())),
                WrapperCapabilities::new(HookOptions::BeforeSwap.flag(), HookFlags::NONE),
            )
            .unwrap();
            let permissions = wrapper.hook_permissions();
            assert!(permissions.before_swap);
            assert!(!permissions.after_swap);
            assert!(wrapper.implementation().hook_permissions().after_swap);
        }

        #[test]
        fn constructor_args_encode_capabilities() {
            let caps = WrapperCapabilities::protective();
            let encoded = caps.constructor_args(POOL_MANAGER_ADDRESS, IMPLEMENTATION_ADDRESS);
            let decoded = WrapperConstructorArgs::abi_decode(&encoded).unwrap();
            assert_eq!(decoded.poolManager, POOL_MANAGER_ADDRESS);
            assert_eq!(decoded.implementation, IMPLEMENTATION_ADDRESS);
            assert_eq!(decoded.forwardedCallbacks, HookFlags::BASE_MASK.bits());
            assert_eq!(decoded.forwardedDeltas, 0);
        }
    }

    proptest! {
        #[test]
        fn validation_is_idempotent(address_bits in any::<u16>(), impl_bits in any::<u16>(), delta_bits in any::<u16>()) {
            let address = address_with(HookFlags::from_bits(address_bits & HookFlags::ALL_HOOK_MASK.bits()));
            let implementation_flags = HookFlags::from_bits(impl_bits & HookFlags::ALL_HOOK_MASK.bits());
            let caps = WrapperCapabilities::new(HookFlags::BASE_MASK, HookFlags::from_bits(delta_bits));
            let first = validate_hook_permissions(address, implementation_flags, &caps).map_err(|e| e.kind());
            let second = validate_hook_permissions(address, implementation_flags, &caps).map_err(|e| e.kind());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn any_other_address_is_rejected(address_bits in any::<u16>(), impl_bits in any::<u16>()) {
            let implementation_flags = HookFlags::from_bits(impl_bits).base();
            let caps = WrapperCapabilities::protective();
            let address_flags = HookFlags::from_bits(address_bits & HookFlags::ALL_HOOK_MASK.bits());
            prop_assume!(address_flags != caps.expected_flags(implementation_flags));
            let address = address_with(address_flags);
            prop_assert!(matches!(
                validate_hook_permissions(address, implementation_flags, &caps),
                Err(Error::AddressFlagsInvalid(a)) if a == address
            ));
        }

        #[test]
        fn valid_only_on_expected_flags(impl_bits in any::<u16>()) {
            let implementation_flags = HookFlags::from_bits(impl_bits & HookFlags::BASE_MASK.bits());
            let caps = WrapperCapabilities::protective();
            let address = address_with(caps.expected_flags(implementation_flags));
            prop_assert!(validate_hook_permissions(address, implementation_flags, &caps).is_ok());
        }
    }
}
