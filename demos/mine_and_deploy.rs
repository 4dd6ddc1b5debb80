use alloy_primitives::{
    address,
    aliases::{I24, U24},
    Address, Bytes, I256, U160,
};
use tracing_subscriber::EnvFilter;
use uniswap_sdk_core::{prelude::*, token};
use uniswap_v4_hook_deployer::{
    abi::{PoolKey, SwapParams},
    config::SimulationConfig,
    entities::BalanceDelta,
    hooks::{FeeCurrency, PoolLedger, SwapGuardHook, WrapperCapabilities},
    pool_manager::SwapOutcome,
    simulation::{Simulation, Transaction},
    utils::Q96,
};

const SWAPPER: Address = address!("66a9893cC07D91D95644AEDD05D03f95e1dBA8Af");
const GUARD_IMPLEMENTATION: Address = address!("1111111111111111111111111111111111111111");

fn exact_input(key: &PoolKey, zero_for_one: bool, amount_in: i128, amount_out: i128) -> Transaction {
    let delta = if zero_for_one {
        BalanceDelta::new(-amount_in, amount_out)
    } else {
        BalanceDelta::new(amount_out, -amount_in)
    };
    Transaction::Swap {
        sender: SWAPPER,
        key: key.clone(),
        params: SwapParams {
            zeroForOne: zero_for_one,
            amountSpecified: I256::try_from(-amount_in).unwrap(),
            sqrtPriceLimitX96: U160::ZERO,
        },
        outcome: SwapOutcome {
            delta,
            sqrt_price_x96: U160::from(Q96),
        },
        hook_data: Bytes::new(),
    }
}

/// Mines a wrapper address for the swap guard, deploys it and runs two blocks of swaps.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_file(path)?,
        None => {
            let mut config = SimulationConfig::default();
            config.factory.capabilities = WrapperCapabilities::full();
            config.miner.max_iterations = 1_000_000;
            config.guard.controller = SWAPPER;
            config.guard.fee_currency = FeeCurrency::Output;
            config
        }
    };
    let mut sim = Simulation::new(config)?;

    let guard = sim.guard()?;
    let deployment = sim.deploy_wrapper(Box::new(guard), GUARD_IMPLEMENTATION)?;
    println!(
        "guard wrapper at {} (salt {}, flags {})",
        deployment.address, deployment.salt, deployment.flags
    );

    let usdc = token!(1, "A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", 6, "USDC");
    let dai = token!(1, "6B175474E89094C44Da98b954EedeAC495271d0F", 18, "DAI");
    let key = PoolKey::from_currencies(
        &usdc.into(),
        &dai.into(),
        U24::from(3000),
        I24::unchecked_from(60),
        deployment.address,
    )?;
    sim.execute(&Transaction::Initialize {
        sender: SWAPPER,
        key: key.clone(),
        sqrt_price_x96: U160::from(Q96),
    })?;

    for block in [
        vec![
            exact_input(&key, true, 1_000_000, 1_003_000),
            exact_input(&key, true, 1_000_000, 1_003_000),
            exact_input(&key, false, 2_000_000, 2_001_000),
        ],
        vec![exact_input(&key, true, 500_000, 500_400)],
    ] {
        let number = sim.block_number();
        for (i, receipt) in sim.run_block(&block).into_iter().enumerate() {
            match receipt {
                Ok(receipt) => println!("block {number} tx {i}: {receipt:?}"),
                Err(err) => println!("block {number} tx {i}: reverted ({err})"),
            }
        }
    }

    let guard_state = sim
        .hook::<SwapGuardHook>(deployment.address)
        .map(|guard| guard.pool_state(key.pool_id()));
    println!("guard state: {guard_state:?}");
    let ledger = sim.manager().ledger();
    println!(
        "retained claims: {} / {}",
        ledger.claims_of(deployment.address, key.currency0),
        ledger.claims_of(deployment.address, key.currency1)
    );
    Ok(())
}
