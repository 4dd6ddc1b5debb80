//! ## Simulation
//! A single-threaded block loop over a [`PoolManager`] and a [`HookFactory`]. Transactions run in
//! order and each one is atomic; whatever a transaction changes is visible to every later one.

use crate::{
    abi::{ModifyLiquidityParams, PoolKey, SwapParams},
    config::SimulationConfig,
    entities::{BalanceDelta, PoolId},
    error::Error,
    factory::{HookFactory, WrapperDeployment},
    hooks::{HookContext, Hooks, SwapGuardHook},
    pool_manager::{PoolManager, SwapOutcome, SwapReceipt},
};
use alloc::{boxed::Box, vec::Vec};
use alloy_primitives::{Address, Bytes, B256, U160, U256};
use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transaction {
    Initialize {
        sender: Address,
        key: PoolKey,
        sqrt_price_x96: U160,
    },
    ModifyLiquidity {
        sender: Address,
        key: PoolKey,
        params: ModifyLiquidityParams,
        principal_delta: BalanceDelta,
        hook_data: Bytes,
    },
    Swap {
        sender: Address,
        key: PoolKey,
        params: SwapParams,
        outcome: SwapOutcome,
        hook_data: Bytes,
    },
    Donate {
        sender: Address,
        key: PoolKey,
        amount0: U256,
        amount1: U256,
        hook_data: Bytes,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Receipt {
    Initialized(PoolId),
    LiquidityModified(BalanceDelta),
    Swapped(SwapReceipt),
    Donated,
}

#[derive(Clone, Debug)]
pub struct Simulation {
    config: SimulationConfig,
    manager: PoolManager,
    factory: HookFactory,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, Error> {
        config.validate()?;
        let manager = PoolManager::new(config.pool_manager, config.start_block);
        let factory = HookFactory::new(config.factory.clone(), config.miner);
        info!(
            pool_manager = %config.pool_manager,
            factory = %config.factory.address,
            start_block = config.start_block,
            "simulation started"
        );
        Ok(Self {
            config,
            manager,
            factory,
        })
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub const fn block_number(&self) -> u64 {
        self.manager.block_number()
    }

    #[inline]
    #[must_use]
    pub const fn manager(&self) -> &PoolManager {
        &self.manager
    }

    #[inline]
    #[must_use]
    pub const fn factory(&self) -> &HookFactory {
        &self.factory
    }

    /// A [`SwapGuardHook`] built from the configured guard settings.
    #[inline]
    pub fn guard(&self) -> Result<SwapGuardHook, Error> {
        SwapGuardHook::new(self.config.guard)
    }

    /// Mines a salt and deploys a wrapper around `implementation`. Leaves no trace on failure.
    pub fn deploy_wrapper(
        &mut self,
        implementation: Box<dyn Hooks>,
        implementation_address: Address,
    ) -> Result<WrapperDeployment, Error> {
        let factory = self.factory.clone();
        let manager = self.manager.clone();
        let result =
            self.factory
                .find_and_deploy(&mut self.manager, implementation, implementation_address);
        if let Err(err) = &result {
            warn!(%err, kind = ?err.kind(), "wrapper deployment failed");
            self.factory = factory;
            self.manager = manager;
        }
        result
    }

    /// Deploys a wrapper with a caller-chosen salt.
    pub fn deploy_wrapper_with_salt(
        &mut self,
        implementation: Box<dyn Hooks>,
        implementation_address: Address,
        salt: B256,
    ) -> Result<Address, Error> {
        let result =
            self.factory
                .deploy(&mut self.manager, implementation, implementation_address, salt);
        if let Err(err) = &result {
            warn!(%err, kind = ?err.kind(), "wrapper deployment failed");
        }
        result
    }

    /// Places a hook directly at `address`, bypassing the factory.
    #[inline]
    pub fn deploy_hook(&mut self, address: Address, hook: Box<dyn Hooks>) -> Result<(), Error> {
        self.manager.deploy_hook(address, hook)
    }

    /// Applies one transaction in the current block.
    pub fn execute(&mut self, tx: &Transaction) -> Result<Receipt, Error> {
        let block = self.block_number();
        let result = match tx {
            Transaction::Initialize {
                sender,
                key,
                sqrt_price_x96,
            } => self
                .manager
                .initialize(*sender, key, *sqrt_price_x96)
                .map(Receipt::Initialized),
            Transaction::ModifyLiquidity {
                sender,
                key,
                params,
                principal_delta,
                hook_data,
            } => self
                .manager
                .modify_liquidity(*sender, key, params, *principal_delta, hook_data)
                .map(Receipt::LiquidityModified),
            Transaction::Swap {
                sender,
                key,
                params,
                outcome,
                hook_data,
            } => self
                .manager
                .swap(*sender, key, params, *outcome, hook_data)
                .map(Receipt::Swapped),
            Transaction::Donate {
                sender,
                key,
                amount0,
                amount1,
                hook_data,
            } => self
                .manager
                .donate(*sender, key, *amount0, *amount1, hook_data)
                .map(|()| Receipt::Donated),
        };
        match &result {
            Ok(receipt) => debug!(block, ?receipt, "transaction applied"),
            Err(err) => warn!(block, %err, kind = ?err.kind(), "transaction reverted"),
        }
        result
    }

    /// Applies `txs` in order within the current block, then closes the block.
    pub fn run_block<'a, I>(&mut self, txs: I) -> Vec<Result<Receipt, Error>>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let receipts: Vec<_> = txs.into_iter().map(|tx| self.execute(tx)).collect();
        let reverted = receipts.iter().filter(|r| r.is_err()).count();
        info!(
            block = self.block_number(),
            transactions = receipts.len(),
            reverted,
            "block closed"
        );
        self.advance_block();
        receipts
    }

    #[inline]
    pub fn advance_block(&mut self) -> u64 {
        self.manager.advance_block()
    }

    /// The hook of type `T` at `address`.
    #[inline]
    #[must_use]
    pub fn hook<T: Hooks + 'static>(&self, address: Address) -> Option<&T> {
        self.manager.hook::<T>(address)
    }

    /// Calls into the hook of type `T` at `address` as a standalone transaction, e.g. for admin
    /// functions.
    #[inline]
    pub fn call_hook<T, R>(
        &mut self,
        address: Address,
        f: impl FnOnce(&mut T, &mut HookContext<'_>) -> Result<R, Error>,
    ) -> Result<R, Error>
    where
        T: Hooks + 'static,
    {
        self.manager.call_hook(address, f)
    }
}
