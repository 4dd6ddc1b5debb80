//! ## CREATE2
//! Content-addressed deployment addresses:
//! `keccak256(0xff ++ deployer ++ salt ++ keccak256(creation_code ++ constructor_args))[12..]`

use alloy_primitives::{keccak256, Address, B256, U256};

/// Hash of the init code, i.e. the creation code followed by the ABI-encoded constructor args.
#[inline]
#[must_use]
pub fn compute_init_code_hash(creation_code: &[u8], constructor_args: &[u8]) -> B256 {
    let mut init_code = alloc::vec::Vec::with_capacity(creation_code.len() + constructor_args.len());
    init_code.extend_from_slice(creation_code);
    init_code.extend_from_slice(constructor_args);
    keccak256(&init_code)
}

#[inline]
#[must_use]
pub fn compute_create2_address(deployer: Address, salt: B256, init_code_hash: B256) -> Address {
    deployer.create2(salt, init_code_hash)
}

/// The salt used for the `index`-th candidate of a salt search.
#[inline]
#[must_use]
pub fn salt_from_index(index: U256) -> B256 {
    B256::from(index.to_be_bytes::<32>())
}
