#![doc = include_str!("../README.md")]
#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    unreachable_pub,
    clippy::missing_const_for_fn,
    clippy::redundant_clone,
    rustdoc::all
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]

extern crate alloc;

pub mod abi;
pub mod config;
pub mod entities;
pub mod error;
pub mod factory;
pub mod hooks;
pub mod pool_manager;
pub mod simulation;
pub mod utils;

#[cfg(test)]
mod tests;

pub mod prelude {
    pub use crate::{
        abi::*, config::*, entities::*, error::*, factory::*, hooks::*, pool_manager::*,
        simulation::*, utils::*,
    };

    pub use uniswap_sdk_core as sdk_core;
    pub use uniswap_v3_sdk as v3_sdk;
}
