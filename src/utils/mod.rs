pub mod create2;
pub mod full_math;
pub mod hook;
pub mod hook_miner;
pub mod swap_fee;

pub use create2::*;
pub use full_math::*;
pub use hook::*;
pub use hook_miner::*;
pub use swap_fee::*;
