// Configuration for fundme-deploy
//
// Loads and saves the deployment configuration as JSON and builds the
// network registry and development-chain set from it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::deploy::{DEFAULT_CONTRACT_NAME, DEFAULT_MOCK_NAME};
use crate::network::{DevelopmentChains, NetworkConfig, NetworkConfigRegistry, DEFAULT_DEVELOPMENT_CHAINS};

/// Deployment configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeployConfig {
    /// Contract to deploy
    pub contract_name: String,

    /// Mock price feed looked up on development networks
    pub mock_name: String,

    /// Hardhat artifacts directory
    pub artifacts_dir: PathBuf,

    /// Deployment record directory
    pub deployments_dir: PathBuf,

    /// Networks treated as local and ephemeral
    pub development_chains: Vec<String>,

    /// Extra or overriding network entries
    pub networks: Vec<NetworkConfig>,

    /// Upper bound on waiting for confirmations
    pub confirmation_timeout_secs: u64,

    /// Delay between explorer status checks
    pub verification_poll_interval_secs: u64,

    /// Explorer status checks before giving up
    pub verification_max_status_checks: u32,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            contract_name: DEFAULT_CONTRACT_NAME.to_string(),
            mock_name: DEFAULT_MOCK_NAME.to_string(),
            artifacts_dir: PathBuf::from("artifacts"),
            deployments_dir: PathBuf::from("deployments"),
            development_chains: DEFAULT_DEVELOPMENT_CHAINS.iter().map(|s| s.to_string()).collect(),
            networks: Vec::new(),
            confirmation_timeout_secs: 500,
            verification_poll_interval_secs: 5,
            verification_max_status_checks: 10,
        }
    }
}

impl DeployConfig {
    /// Built-in networks with the configured entries layered on top
    pub fn registry(&self) -> NetworkConfigRegistry {
        let mut registry = NetworkConfigRegistry::new();
        for network in &self.networks {
            registry.add_config(network.clone());
        }
        registry
    }

    pub fn development_chains(&self) -> DevelopmentChains {
        DevelopmentChains::new(self.development_chains.iter().cloned())
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn verification_poll_interval(&self) -> Duration {
        Duration::from_secs(self.verification_poll_interval_secs)
    }
}

/// Configuration manager for fundme-deploy
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<DeployConfig> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&config_str)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(config: &DeployConfig, path: P) -> Result<()> {
        let config_str = serde_json::to_string_pretty(config)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    /// Create a builder for configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for creating configurations
#[derive(Default)]
pub struct ConfigBuilder {
    config: DeployConfig,
}

impl ConfigBuilder {
    pub fn contract_name(mut self, value: impl Into<String>) -> Self {
        self.config.contract_name = value.into();
        self
    }

    pub fn mock_name(mut self, value: impl Into<String>) -> Self {
        self.config.mock_name = value.into();
        self
    }

    pub fn artifacts_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.config.artifacts_dir = value.into();
        self
    }

    pub fn deployments_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.config.deployments_dir = value.into();
        self
    }

    pub fn development_chain(mut self, value: impl Into<String>) -> Self {
        self.config.development_chains.push(value.into());
        self
    }

    pub fn network(mut self, value: NetworkConfig) -> Self {
        self.config.networks.push(value);
        self
    }

    pub fn confirmation_timeout_secs(mut self, value: u64) -> Self {
        self.config.confirmation_timeout_secs = value;
        self
    }

    /// Build the configuration
    pub fn build(self) -> DeployConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::Address;
    use tempfile::tempdir;

    #[test]
    fn test_config_builder() {
        let config = ConfigManager::builder()
            .contract_name("FundMeV2")
            .development_chain("anvil")
            .confirmation_timeout_secs(60)
            .build();

        assert_eq!(config.contract_name, "FundMeV2");
        assert_eq!(config.mock_name, DEFAULT_MOCK_NAME);
        assert!(config.development_chains().contains("anvil"));
        assert!(config.development_chains().contains("localhost"));
        assert_eq!(config.confirmation_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_config_save_load() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("deploy.json");

        let config = ConfigManager::builder()
            .network(NetworkConfig::new(137, "polygon").with_dependency_address(Address::from_low_u64_be(7)))
            .build();

        ConfigManager::save_to_file(&config, &file_path)?;
        let loaded_config = ConfigManager::load_from_file(&file_path)?;

        assert_eq!(loaded_config, config);
        assert_eq!(loaded_config.registry().dependency_address(137)?, Address::from_low_u64_be(7));
        Ok(())
    }

    #[test]
    fn test_partial_config_uses_defaults() -> Result<()> {
        let config: DeployConfig = serde_json::from_str(r#"{"mockName": "MockPriceFeed"}"#)?;
        assert_eq!(config.mock_name, "MockPriceFeed");
        assert_eq!(config.contract_name, DEFAULT_CONTRACT_NAME);
        assert_eq!(config.artifacts_dir, PathBuf::from("artifacts"));
        Ok(())
    }

    #[test]
    fn test_configured_network_overrides_builtin() {
        let config = ConfigManager::builder()
            .network(NetworkConfig::goerli().with_block_confirmations(12))
            .build();

        assert_eq!(config.registry().config_for(5).unwrap().block_confirmations, Some(12));
    }
}
