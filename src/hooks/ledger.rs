use crate::{
    abi::PoolKey,
    entities::PoolId,
    error::Error,
};
use alloy_primitives::{Address, U160, U256};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot0 {
    pub sqrt_price_x96: U160,
    pub lp_fee: u32,
}

/// The slice of the pool manager a hook may touch while it is being called.
///
/// Every mutating method attributes its currency delta to `account`, which must net to zero by
/// the end of the enclosing transaction.
pub trait PoolLedger {
    fn current_block(&self) -> u64;

    fn slot0(&self, pool_id: PoolId) -> Result<Slot0, Error>;

    /// Donates to the in-range liquidity providers of an initialized pool. Debits `account`.
    fn donate(
        &mut self,
        account: Address,
        key: &PoolKey,
        amount0: U256,
        amount1: U256,
    ) -> Result<(), Error>;

    /// Mints ERC-6909 style claims of `currency` to `account`. Debits `account`.
    fn mint_claims(&mut self, account: Address, currency: Address, amount: U256)
        -> Result<(), Error>;

    /// Burns claims held by `account`. Credits `account`.
    fn burn_claims(&mut self, account: Address, currency: Address, amount: U256)
        -> Result<(), Error>;

    fn claims_of(&self, owner: Address, currency: Address) -> U256;

    /// Pays `amount` of `currency` out to `to`. Debits `account`.
    fn take(
        &mut self,
        account: Address,
        currency: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), Error>;
}
