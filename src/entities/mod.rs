mod balance_delta;
mod pool_key;

pub use balance_delta::*;
pub use pool_key::*;
