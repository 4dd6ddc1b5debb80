//! ## Hook Flags
//! V4 decides which hooks to call by inspecting the least significant 14 bits of the hook address.
//! This module decodes those bits, encodes permission sets back into flags and enforces the rule
//! that a "returns delta" flag is only meaningful together with its base callback.

use alloy_primitives::{Address, U160};
use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HookOptions {
    AfterRemoveLiquidityReturnsDelta = 0,
    AfterAddLiquidityReturnsDelta = 1,
    AfterSwapReturnsDelta = 2,
    BeforeSwapReturnsDelta = 3,
    AfterDonate = 4,
    BeforeDonate = 5,
    AfterSwap = 6,
    BeforeSwap = 7,
    AfterRemoveLiquidity = 8,
    BeforeRemoveLiquidity = 9,
    AfterAddLiquidity = 10,
    BeforeAddLiquidity = 11,
    AfterInitialize = 12,
    BeforeInitialize = 13,
}

impl HookOptions {
    pub const ALL: [Self; 14] = [
        Self::AfterRemoveLiquidityReturnsDelta,
        Self::AfterAddLiquidityReturnsDelta,
        Self::AfterSwapReturnsDelta,
        Self::BeforeSwapReturnsDelta,
        Self::AfterDonate,
        Self::BeforeDonate,
        Self::AfterSwap,
        Self::BeforeSwap,
        Self::AfterRemoveLiquidity,
        Self::BeforeRemoveLiquidity,
        Self::AfterAddLiquidity,
        Self::BeforeAddLiquidity,
        Self::AfterInitialize,
        Self::BeforeInitialize,
    ];

    /// The flag bit of this option.
    #[inline]
    #[must_use]
    pub const fn flag(self) -> HookFlags {
        HookFlags(1 << self as u16)
    }

    /// The callback a "returns delta" option depends on, `None` for base callbacks.
    #[inline]
    #[must_use]
    pub const fn base_callback(self) -> Option<Self> {
        match self {
            Self::BeforeSwapReturnsDelta => Some(Self::BeforeSwap),
            Self::AfterSwapReturnsDelta => Some(Self::AfterSwap),
            Self::AfterAddLiquidityReturnsDelta => Some(Self::AfterAddLiquidity),
            Self::AfterRemoveLiquidityReturnsDelta => Some(Self::AfterRemoveLiquidity),
            _ => None,
        }
    }
}

/// A set of hook flags laid out exactly as in the low 14 bits of a hook address.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deref, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct HookFlags(u16);

impl HookFlags {
    pub const NONE: Self = Self(0);
    pub const ALL_HOOK_MASK: Self = Self((1 << 14) - 1);
    /// The four "returns delta" modifiers.
    pub const DELTA_MASK: Self = Self(0x000F);
    /// Every lifecycle callback, without the delta modifiers.
    pub const BASE_MASK: Self = Self(0x3FF0);

    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    #[inline]
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Decodes the flags carried in the low-order bits of `address`.
    #[inline]
    #[must_use]
    pub const fn from_address(address: Address) -> Self {
        let mask = (address.0 .0[18] as u16) << 8 | (address.0 .0[19] as u16);
        Self(mask & Self::ALL_HOOK_MASK.0)
    }

    /// Builds a flag set from a list of options.
    #[inline]
    #[must_use]
    pub fn from_options(options: &[HookOptions]) -> Self {
        options
            .iter()
            .fold(Self::NONE, |flags, option| flags | option.flag())
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, option: HookOptions) -> bool {
        self.0 & (1 << option as u16) != 0
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub const fn base(self) -> Self {
        Self(self.0 & Self::BASE_MASK.0)
    }

    #[inline]
    #[must_use]
    pub const fn deltas(self) -> Self {
        Self(self.0 & Self::DELTA_MASK.0)
    }

    /// No bits outside the hook mask, and every delta modifier comes with its base callback.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        if self.0 & !Self::ALL_HOOK_MASK.0 != 0 {
            return false;
        }
        !(self.contains(HookOptions::BeforeSwapReturnsDelta)
            && !self.contains(HookOptions::BeforeSwap)
            || self.contains(HookOptions::AfterSwapReturnsDelta)
                && !self.contains(HookOptions::AfterSwap)
            || self.contains(HookOptions::AfterAddLiquidityReturnsDelta)
                && !self.contains(HookOptions::AfterAddLiquidity)
            || self.contains(HookOptions::AfterRemoveLiquidityReturnsDelta)
                && !self.contains(HookOptions::AfterRemoveLiquidity))
    }

    /// Whether `address` carries exactly these flags in its masked bits.
    #[inline]
    #[must_use]
    pub const fn matches_address(self, address: Address) -> bool {
        Self::from_address(address).0 == self.0
    }

    /// The options set in this flag set, lowest bit first.
    #[inline]
    pub fn options(self) -> impl Iterator<Item = HookOptions> {
        HookOptions::ALL
            .into_iter()
            .filter(move |option| self.contains(*option))
    }
}

impl core::ops::BitOr for HookFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for HookFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl core::ops::BitAnd for HookFlags {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl core::ops::Not for HookFlags {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        Self(!self.0 & Self::ALL_HOOK_MASK.0)
    }
}

impl From<HookFlags> for U160 {
    #[inline]
    fn from(flags: HookFlags) -> Self {
        Self::from(flags.0)
    }
}

impl core::fmt::Display for HookFlags {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookPermissions {
    pub after_remove_liquidity_returns_delta: bool,
    pub after_add_liquidity_returns_delta: bool,
    pub after_swap_returns_delta: bool,
    pub before_swap_returns_delta: bool,
    pub after_donate: bool,
    pub before_donate: bool,
    pub after_swap: bool,
    pub before_swap: bool,
    pub after_remove_liquidity: bool,
    pub before_remove_liquidity: bool,
    pub after_add_liquidity: bool,
    pub before_add_liquidity: bool,
    pub after_initialize: bool,
    pub before_initialize: bool,
}

impl HookPermissions {
    #[inline]
    #[must_use]
    pub const fn from_flags(flags: HookFlags) -> Self {
        Self {
            before_initialize: flags.contains(HookOptions::BeforeInitialize),
            after_initialize: flags.contains(HookOptions::AfterInitialize),
            before_add_liquidity: flags.contains(HookOptions::BeforeAddLiquidity),
            after_add_liquidity: flags.contains(HookOptions::AfterAddLiquidity),
            before_remove_liquidity: flags.contains(HookOptions::BeforeRemoveLiquidity),
            after_remove_liquidity: flags.contains(HookOptions::AfterRemoveLiquidity),
            before_swap: flags.contains(HookOptions::BeforeSwap),
            after_swap: flags.contains(HookOptions::AfterSwap),
            before_donate: flags.contains(HookOptions::BeforeDonate),
            after_donate: flags.contains(HookOptions::AfterDonate),
            before_swap_returns_delta: flags.contains(HookOptions::BeforeSwapReturnsDelta),
            after_swap_returns_delta: flags.contains(HookOptions::AfterSwapReturnsDelta),
            after_add_liquidity_returns_delta: flags
                .contains(HookOptions::AfterAddLiquidityReturnsDelta),
            after_remove_liquidity_returns_delta: flags
                .contains(HookOptions::AfterRemoveLiquidityReturnsDelta),
        }
    }

    #[inline]
    #[must_use]
    pub fn flags(&self) -> HookFlags {
        let set = [
            (self.after_remove_liquidity_returns_delta, HookOptions::AfterRemoveLiquidityReturnsDelta),
            (self.after_add_liquidity_returns_delta, HookOptions::AfterAddLiquidityReturnsDelta),
            (self.after_swap_returns_delta, HookOptions::AfterSwapReturnsDelta),
            (self.before_swap_returns_delta, HookOptions::BeforeSwapReturnsDelta),
            (self.after_donate, HookOptions::AfterDonate),
            (self.before_donate, HookOptions::BeforeDonate),
            (self.after_swap, HookOptions::AfterSwap),
            (self.before_swap, HookOptions::BeforeSwap),
            (self.after_remove_liquidity, HookOptions::AfterRemoveLiquidity),
            (self.before_remove_liquidity, HookOptions::BeforeRemoveLiquidity),
            (self.after_add_liquidity, HookOptions::AfterAddLiquidity),
            (self.before_add_liquidity, HookOptions::BeforeAddLiquidity),
            (self.after_initialize, HookOptions::AfterInitialize),
            (self.before_initialize, HookOptions::BeforeInitialize),
        ];
        set.into_iter()
            .filter(|(enabled, _)| *enabled)
            .fold(HookFlags::NONE, |flags, (_, option)| flags | option.flag())
    }
}

impl From<HookFlags> for HookPermissions {
    #[inline]
    fn from(flags: HookFlags) -> Self {
        Self::from_flags(flags)
    }
}

impl From<HookPermissions> for HookFlags {
    #[inline]
    fn from(permissions: HookPermissions) -> Self {
        permissions.flags()
    }
}

#[inline]
#[must_use]
pub const fn permissions(address: Address) -> HookPermissions {
    HookPermissions::from_flags(HookFlags::from_address(address))
}

#[inline]
#[must_use]
pub const fn has_permission(address: Address, hook_option: HookOptions) -> bool {
    HookFlags::from_address(address).contains(hook_option)
}

#[inline]
#[must_use]
pub const fn has_initialize_permissions(address: Address) -> bool {
    has_permission(address, HookOptions::BeforeInitialize)
        || has_permission(address, HookOptions::AfterInitialize)
}

#[inline]
#[must_use]
pub const fn has_liquidity_permissions(address: Address) -> bool {
    has_permission(address, HookOptions::BeforeAddLiquidity)
        || has_permission(address, HookOptions::AfterAddLiquidity)
        || has_permission(address, HookOptions::BeforeRemoveLiquidity)
        || has_permission(address, HookOptions::AfterRemoveLiquidity)
}

#[inline]
#[must_use]
pub const fn has_swap_permissions(address: Address) -> bool {
    // this implicitly encapsulates swap delta permissions
    has_permission(address, HookOptions::BeforeSwap)
        || has_permission(address, HookOptions::AfterSwap)
}

#[inline]
#[must_use]
pub const fn has_donate_permissions(address: Address) -> bool {
    has_permission(address, HookOptions::BeforeDonate)
        || has_permission(address, HookOptions::AfterDonate)
}

/// Pool LP fee value marking a dynamic-fee pool.
pub const DYNAMIC_FEE_FLAG: u32 = 0x80_0000;

/// Mirrors `Hooks.isValidHookAddress`: delta flags need their base callback, a pool without hooks
/// can't have a dynamic fee, and a hook address must carry at least one flag unless the fee is
/// dynamic.
#[inline]
#[must_use]
pub fn is_valid_hook_address(address: Address, fee: u32) -> bool {
    let flags = HookFlags::from_address(address);
    if !flags.is_valid() {
        return false;
    }
    let is_dynamic = fee == DYNAMIC_FEE_FLAG;
    if address.is_zero() {
        !is_dynamic
    } else {
        !flags.is_empty() || is_dynamic
    }
}
