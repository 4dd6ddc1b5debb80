//! ## Configuration
//! Settings for a [`Simulation`](crate::simulation::Simulation). Every field has a default, so a
//! TOML file only needs to name what it changes.

use crate::{
    error::Error,
    factory::FactoryConfig,
    hooks::GuardConfig,
    utils::{validate_protocol_fee_bips, HookMiner},
};
use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Address of the pool manager hooks are registered with.
    pub pool_manager: Address,
    /// Block number of the first block.
    pub start_block: u64,
    pub miner: HookMiner,
    pub factory: FactoryConfig,
    pub guard: GuardConfig,
}

impl Default for SimulationConfig {
    #[inline]
    fn default() -> Self {
        Self {
            pool_manager: address!("000000000004444c5dc75cB358380D2e3dE08A90"),
            start_block: 1,
            miner: HookMiner::default(),
            factory: FactoryConfig::default(),
            guard: GuardConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.miner.max_iterations == 0 {
            return Err(Error::Config("miner.max_iterations must be positive".into()));
        }
        if self.factory.creation_code.is_empty() {
            return Err(Error::Config("factory.creation_code is empty".into()));
        }
        validate_protocol_fee_bips(self.guard.protocol_fee_bips)?;
        Ok(())
    }
}

#[cfg(feature = "std")]
impl SimulationConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Error> {
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, Error> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::FeeCurrency;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.miner.max_iterations, HookMiner::MAX_LOOP);
        assert_eq!(config.guard.protocol_fee_bips, 1_000);
        assert_eq!(config.guard.fee_currency, FeeCurrency::AlwaysCurrency1);
    }

    #[test]
    #[cfg(feature = "std")]
    fn test_partial_toml() {
        let config = SimulationConfig::from_toml_str(
            r#"
            start_block = 100

            [miner]
            max_iterations = 500000

            [guard]
            controller = "0x00000000000000000000000000000000000000c0"
            protocol_fee_bips = 2500
            fee_currency = "output"
            "#,
        )
        .unwrap();
        assert_eq!(config.start_block, 100);
        assert_eq!(config.miner.max_iterations, 500_000);
        assert_eq!(config.guard.protocol_fee_bips, 2_500);
        assert_eq!(config.guard.fee_currency, FeeCurrency::Output);
        assert_eq!(config.factory, FactoryConfig::default());
    }

    #[test]
    #[cfg(feature = "std")]
    fn test_rejects_invalid_bips() {
        let err = SimulationConfig::from_toml_str("[guard]\nprotocol_fee_bips = 10\n").unwrap_err();
        assert!(matches!(err, Error::InvalidProtocolFeeBips(10)));
    }

    #[test]
    #[cfg(feature = "std")]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            SimulationConfig::from_toml_str("start_block = \"soon\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    #[cfg(feature = "std")]
    fn test_toml_round_trip() {
        let config = SimulationConfig::default();
        let encoded = config.to_toml_string().unwrap();
        assert_eq!(SimulationConfig::from_toml_str(&encoded).unwrap(), config);
    }
}
