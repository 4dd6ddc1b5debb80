//! ## Hook Miner
//! Brute-force search for a CREATE2 salt that places a hook at an address whose low 14 bits are
//! exactly the requested [`HookFlags`].
//!
//! The search is deterministic: salts are tried in increasing order starting at
//! [`HookMiner::start_salt`], so identical inputs always yield the same `(address, salt)`. The
//! expected number of attempts is about `2^14`, independent of the address width.

use super::{compute_create2_address, compute_init_code_hash, salt_from_index, HookFlags};
use crate::error::Error;
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookMiner {
    /// Number of salts to try before giving up.
    pub max_iterations: u64,
    /// First salt of the search.
    pub start_salt: U256,
}

impl Default for HookMiner {
    #[inline]
    fn default() -> Self {
        Self {
            max_iterations: Self::MAX_LOOP,
            start_salt: U256::ZERO,
        }
    }
}

impl HookMiner {
    /// Iteration cap of the reference Solidity miner.
    pub const MAX_LOOP: u64 = 160_444;

    #[inline]
    #[must_use]
    pub const fn new(max_iterations: u64) -> Self {
        Self {
            max_iterations,
            start_salt: U256::ZERO,
        }
    }

    #[inline]
    #[must_use]
    pub const fn with_start_salt(mut self, start_salt: U256) -> Self {
        self.start_salt = start_salt;
        self
    }

    /// Finds a salt for deploying `creation_code ++ constructor_args` from `deployer` such that
    /// the resulting address carries exactly `flags`.
    ///
    /// ## Arguments
    ///
    /// * `deployer`: The address that will execute CREATE2
    /// * `flags`: The desired hook flags
    /// * `creation_code`: The creation code of the hook contract
    /// * `constructor_args`: The ABI-encoded constructor arguments
    #[inline]
    pub fn find(
        &self,
        deployer: Address,
        flags: HookFlags,
        creation_code: &[u8],
        constructor_args: &[u8],
    ) -> Result<(Address, B256), Error> {
        let init_code_hash = compute_init_code_hash(creation_code, constructor_args);
        self.find_with_init_code_hash(deployer, flags, init_code_hash)
    }

    #[inline]
    pub fn find_with_init_code_hash(
        &self,
        deployer: Address,
        flags: HookFlags,
        init_code_hash: B256,
    ) -> Result<(Address, B256), Error> {
        self.find_unoccupied(deployer, flags, init_code_hash, |_| false)
    }

    /// Like [`Self::find_with_init_code_hash`], but skips candidate addresses for which
    /// `is_occupied` returns true.
    #[inline]
    pub fn find_unoccupied<F>(
        &self,
        deployer: Address,
        flags: HookFlags,
        init_code_hash: B256,
        mut is_occupied: F,
    ) -> Result<(Address, B256), Error>
    where
        F: FnMut(Address) -> bool,
    {
        if !flags.is_valid() {
            return Err(Error::InvalidHookFlags(flags));
        }
        let mut attempts = 0_u64;
        let mut index = self.start_salt;
        while attempts < self.max_iterations {
            let salt = salt_from_index(index);
            let address = compute_create2_address(deployer, salt, init_code_hash);
            attempts += 1;
            if flags.matches_address(address) {
                if !is_occupied(address) {
                    debug!(%address, %salt, attempts, %flags, "found hook salt");
                    return Ok((address, salt));
                }
                trace!(%address, "candidate already deployed, skipping");
            }
            index = match index.checked_add(U256::from(1)) {
                Some(next) => next,
                None => break,
            };
        }
        warn!(attempts, %flags, %deployer, "hook salt search exhausted");
        Err(Error::MiningExhausted { attempts })
    }
}
