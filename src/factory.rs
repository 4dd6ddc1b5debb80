//! ## Hook Factory
//! Deploys [`HookWrapper`]s through CREATE2. The factory mines a salt whose address advertises the
//! forwardable subset of an implementation's callbacks, and registers the wrapper with the pool
//! manager only once the wrapper's own validation has passed.

use crate::{
    error::Error,
    hooks::{HookWrapper, Hooks, WrapperCapabilities},
    pool_manager::PoolManager,
    utils::{compute_create2_address, compute_init_code_hash, HookFlags, HookMiner},
};
use alloc::{boxed::Box, collections::BTreeMap};
use alloy_primitives::{address, Address, Bytes, B256};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// The CREATE2 deployer.
    pub address: Address,
    /// Creation code of the wrapper, without constructor arguments.
    pub creation_code: Bytes,
    pub capabilities: WrapperCapabilities,
}

impl Default for FactoryConfig {
    #[inline]
    fn default() -> Self {
        Self {
            address: address!("4e59b44847b379578588920cA78FbF26c0B4956C"),
            creation_code: Bytes::from_static(&[0x60, 0x80, 0x60, 0x40, 0x52]),
            capabilities: WrapperCapabilities::protective(),
        }
    }
}

/// A wrapper deployed by the factory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapperDeployment {
    pub address: Address,
    pub salt: B256,
    pub implementation: Address,
    pub flags: HookFlags,
}

#[derive(Clone, Debug)]
pub struct HookFactory {
    config: FactoryConfig,
    miner: HookMiner,
    deployments: BTreeMap<Address, WrapperDeployment>,
}

impl HookFactory {
    #[inline]
    #[must_use]
    pub fn new(config: FactoryConfig, miner: HookMiner) -> Self {
        Self {
            config,
            miner,
            deployments: BTreeMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn address(&self) -> Address {
        self.config.address
    }

    #[inline]
    #[must_use]
    pub const fn capabilities(&self) -> &WrapperCapabilities {
        &self.config.capabilities
    }

    #[inline]
    #[must_use]
    pub const fn miner(&self) -> &HookMiner {
        &self.miner
    }

    /// The init code hash of a wrapper around `implementation` for `pool_manager`.
    #[inline]
    #[must_use]
    pub fn init_code_hash(&self, pool_manager: Address, implementation: Address) -> B256 {
        let args = self
            .config
            .capabilities
            .constructor_args(pool_manager, implementation);
        compute_init_code_hash(&self.config.creation_code, &args)
    }

    /// The flags a wrapper around `implementation` has to carry.
    #[inline]
    #[must_use]
    pub fn expected_flags(&self, implementation: &dyn Hooks) -> HookFlags {
        self.config
            .capabilities
            .expected_flags(implementation.hook_permissions().flags())
    }

    /// Address of a wrapper deployed with `salt`.
    #[inline]
    #[must_use]
    pub fn compute_address(&self, pool_manager: Address, implementation: Address, salt: B256) -> Address {
        compute_create2_address(
            self.config.address,
            salt,
            self.init_code_hash(pool_manager, implementation),
        )
    }

    /// Mines a salt for wrapping `implementation`, skipping addresses already in use on `host`.
    ///
    /// ## Arguments
    ///
    /// * `host`: The pool manager the wrapper will serve
    /// * `implementation`: The implementation hook
    /// * `implementation_address`: Where the implementation lives
    #[inline]
    pub fn find_salt(
        &self,
        host: &PoolManager,
        implementation: &dyn Hooks,
        implementation_address: Address,
    ) -> Result<(Address, B256), Error> {
        let flags = self.expected_flags(implementation);
        let init_code_hash = self.init_code_hash(host.address(), implementation_address);
        self.miner
            .find_unoccupied(self.config.address, flags, init_code_hash, |candidate| {
                host.is_deployed(candidate)
            })
    }

    /// Deploys a wrapper around `implementation` with `salt` and registers it on `host`.
    ///
    /// Nothing is registered if the wrapper rejects its address.
    pub fn deploy(
        &mut self,
        host: &mut PoolManager,
        implementation: Box<dyn Hooks>,
        implementation_address: Address,
        salt: B256,
    ) -> Result<Address, Error> {
        let address = self.compute_address(host.address(), implementation_address, salt);
        if host.is_deployed(address) {
            return Err(Error::AddressAlreadyDeployed(address));
        }
        let wrapper = HookWrapper::new(
            address,
            implementation_address,
            implementation,
            self.config.capabilities,
        )?;
        host.deploy_hook(address, Box::new(wrapper))?;
        let deployment = WrapperDeployment {
            address,
            salt,
            implementation: implementation_address,
            flags: HookFlags::from_address(address),
        };
        self.deployments.insert(address, deployment);
        info!(%address, %salt, implementation = %implementation_address, "wrapper deployed");
        Ok(address)
    }

    /// Mines a salt and deploys with it.
    #[inline]
    pub fn find_and_deploy(
        &mut self,
        host: &mut PoolManager,
        implementation: Box<dyn Hooks>,
        implementation_address: Address,
    ) -> Result<WrapperDeployment, Error> {
        let (address, salt) = self.find_salt(host, implementation.as_ref(), implementation_address)?;
        let deployed = self.deploy(host, implementation, implementation_address, salt)?;
        debug_assert_eq!(address, deployed);
        self.deployments
            .get(&deployed)
            .copied()
            .ok_or(Error::HookNotDeployed(deployed))
    }

    #[inline]
    #[must_use]
    pub fn deployment(&self, address: Address) -> Option<&WrapperDeployment> {
        self.deployments.get(&address)
    }

    #[inline]
    pub fn deployments(&self) -> impl Iterator<Item = &WrapperDeployment> {
        self.deployments.values()
    }
}
