use crate::{
    abi,
    entities::{PoolId, SwapDirection},
    utils::HookFlags,
};
use alloc::string::String;
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolError;

/// Broad classification of [`Error`] variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Deployment-time rejection. Re-mine or pick another implementation.
    Validation,
    /// Runtime rejection by a hook policy. Fatal to the enclosing transaction.
    Policy,
    /// A bounded search ran out of iterations.
    ResourceExhaustion,
    /// Unbalanced or insufficient currency accounting.
    Accounting,
    /// Caller is not allowed to perform the operation.
    Access,
    /// Malformed input.
    Input,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("hook address {0} does not carry the flags implied by the implementation")]
    AddressFlagsInvalid(Address),

    #[error("implementation behind {0} declares a delta the wrapper does not forward")]
    PermissionForbidden(Address),

    #[error("invalid hook flags {0}")]
    InvalidHookFlags(HookFlags),

    #[error("hook address {0} is not valid for fee {1}")]
    HookAddressNotValid(Address, u32),

    #[error("address {0} is already deployed")]
    AddressAlreadyDeployed(Address),

    #[error("no contract deployed at {0}")]
    HookNotDeployed(Address),

    #[error("{0} swap already executed in this block")]
    DirectionAlreadyUsedThisBlock(SwapDirection),

    #[error("salt search exhausted after {attempts} attempts")]
    MiningExhausted { attempts: u64 },

    #[error("hook returned an invalid response")]
    InvalidHookResponse,

    #[error("hook callback not implemented")]
    HookNotImplemented,

    #[error("currency {currency} not settled by {account}")]
    CurrencyNotSettled { account: Address, currency: Address },

    #[error("insufficient claims of {currency} held by {owner}")]
    InsufficientClaims { owner: Address, currency: Address },

    #[error("pool {0} is not initialized")]
    PoolNotInitialized(PoolId),

    #[error("pool {0} is already initialized")]
    PoolAlreadyInitialized(PoolId),

    #[error("sqrt price out of bounds")]
    InvalidSqrtPrice,

    #[error("currencies out of order or identical")]
    CurrenciesOutOfOrder,

    #[error("protocol fee of {0} bips is out of range")]
    InvalidProtocolFeeBips(u16),

    #[error("unauthorized caller {0}")]
    Unauthorized(Address),

    #[error("overflow")]
    Overflow,

    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AddressFlagsInvalid(_)
            | Self::PermissionForbidden(_)
            | Self::InvalidHookFlags(_)
            | Self::HookAddressNotValid(..)
            | Self::AddressAlreadyDeployed(_) => ErrorKind::Validation,
            Self::DirectionAlreadyUsedThisBlock(_) => ErrorKind::Policy,
            Self::MiningExhausted { .. } => ErrorKind::ResourceExhaustion,
            Self::CurrencyNotSettled { .. } | Self::InsufficientClaims { .. } => {
                ErrorKind::Accounting
            }
            Self::Unauthorized(_) => ErrorKind::Access,
            _ => ErrorKind::Input,
        }
    }

    /// The ABI-encoded revert data a host contract would surface for this error, if it maps to a
    /// Solidity custom error.
    #[inline]
    #[must_use]
    pub fn revert_data(&self) -> Option<Bytes> {
        let data = match self {
            Self::AddressFlagsInvalid(hooks) => {
                abi::HookAddressNotValid { hooks: *hooks }.abi_encode()
            }
            Self::PermissionForbidden(hooks) => {
                abi::HookPermissionForbidden { hooks: *hooks }.abi_encode()
            }
            Self::HookAddressNotValid(hooks, _) => {
                abi::HookAddressNotValid { hooks: *hooks }.abi_encode()
            }
            Self::DirectionAlreadyUsedThisBlock(SwapDirection::ZeroForOne) => {
                abi::ZeroForOneSwapAlreadyExecuted {}.abi_encode()
            }
            Self::DirectionAlreadyUsedThisBlock(SwapDirection::OneForZero) => {
                abi::OneForZeroSwapAlreadyExecuted {}.abi_encode()
            }
            Self::CurrencyNotSettled { .. } => abi::CurrencyNotSettled {}.abi_encode(),
            Self::InvalidHookResponse => abi::InvalidHookResponse {}.abi_encode(),
            Self::HookNotImplemented => abi::HookNotImplemented {}.abi_encode(),
            Self::Unauthorized(_) => abi::Unauthorized {}.abi_encode(),
            _ => return None,
        };
        Some(data.into())
    }
}
