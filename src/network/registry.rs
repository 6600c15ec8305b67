// Network configurations
//
// Static per-network deployment parameters, keyed by chain id.

use std::collections::HashMap;

use common::ConfigurationError;
use ethers::types::Address;
use hex_literal::hex;
use serde::{Deserialize, Serialize};

/// Deployment parameters for a single network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Chain ID
    pub chain_id: u64,

    /// Network name
    pub name: String,

    /// ETH/USD price feed the contract is constructed with
    #[serde(default)]
    pub dependency_address: Option<Address>,

    /// Recommended confirmations to wait for after deployment
    #[serde(default)]
    pub block_confirmations: Option<u64>,

    /// JSON-RPC endpoint
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Explorer API endpoint, overriding the one derived from the name
    #[serde(default)]
    pub explorer_api_url: Option<String>,
}

impl NetworkConfig {
    /// Create a new network configuration
    pub fn new(chain_id: u64, name: impl Into<String>) -> Self {
        Self {
            chain_id,
            name: name.into(),
            dependency_address: None,
            block_confirmations: None,
            rpc_url: None,
            explorer_api_url: None,
        }
    }

    pub fn with_dependency_address(mut self, address: Address) -> Self {
        self.dependency_address = Some(address);
        self
    }

    pub fn with_block_confirmations(mut self, confirmations: u64) -> Self {
        self.block_confirmations = Some(confirmations);
        self
    }

    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    /// Local Hardhat node. Uses a mock price feed, so no address.
    pub fn localhost() -> Self {
        Self::new(31337, "localhost").with_rpc_url("http://127.0.0.1:8545/")
    }

    /// Goerli testnet
    pub fn goerli() -> Self {
        Self::new(5, "goerli")
            .with_dependency_address(Address::from(hex!("D4a33860578De61DBAbDc8BFdb98FD742fA7028e")))
            .with_block_confirmations(6)
    }

    /// Sepolia testnet
    pub fn sepolia() -> Self {
        Self::new(11155111, "sepolia")
            .with_dependency_address(Address::from(hex!("694AA1769357215DE4FAC081bf1f309aDC325306")))
            .with_block_confirmations(6)
    }
}

/// Registry for looking up network configurations
#[derive(Debug, Clone)]
pub struct NetworkConfigRegistry {
    /// Map of chain ID to network configuration
    configs: HashMap<u64, NetworkConfig>,
}

impl NetworkConfigRegistry {
    /// Create a new registry with the built-in networks
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.add_config(NetworkConfig::localhost());
        registry.add_config(NetworkConfig::goerli());
        registry.add_config(NetworkConfig::sepolia());

        registry
    }

    /// Create a registry with no entries
    pub fn empty() -> Self {
        Self {
            configs: HashMap::new(),
        }
    }

    /// Add or replace a network configuration
    pub fn add_config(&mut self, config: NetworkConfig) {
        self.configs.insert(config.chain_id, config);
    }

    /// Get the configuration for a chain ID
    pub fn config_for(&self, chain_id: u64) -> Result<&NetworkConfig, ConfigurationError> {
        self.configs
            .get(&chain_id)
            .ok_or(ConfigurationError::UnknownNetwork { chain_id })
    }

    /// Get the statically known dependency address for a chain ID
    pub fn dependency_address(&self, chain_id: u64) -> Result<Address, ConfigurationError> {
        let config = self.config_for(chain_id)?;
        config
            .dependency_address
            .ok_or_else(|| ConfigurationError::MissingDependencyAddress {
                chain_id,
                network: config.name.clone(),
            })
    }

    /// Find a configuration by network name
    pub fn find_by_name(&self, name: &str) -> Option<&NetworkConfig> {
        self.configs.values().find(|config| config.name == name)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl Default for NetworkConfigRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<NetworkConfig> for NetworkConfigRegistry {
    fn from_iter<I: IntoIterator<Item = NetworkConfig>>(iter: I) -> Self {
        let mut registry = Self::empty();
        for config in iter {
            registry.add_config(config);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_goerli_feed_address() {
        let registry = NetworkConfigRegistry::new();
        let expected = Address::from_str("0xD4a33860578De61DBAbDc8BFdb98FD742fA7028e").unwrap();

        assert_eq!(registry.dependency_address(5).unwrap(), expected);
        assert_eq!(registry.config_for(5).unwrap().name, "goerli");
    }

    #[test]
    fn test_unknown_chain_is_not_found() {
        let registry = NetworkConfigRegistry::new();
        assert_eq!(
            registry.config_for(99).unwrap_err(),
            ConfigurationError::UnknownNetwork { chain_id: 99 }
        );
    }

    #[test]
    fn test_localhost_has_no_static_feed() {
        let registry = NetworkConfigRegistry::new();
        assert_eq!(
            registry.dependency_address(31337).unwrap_err(),
            ConfigurationError::MissingDependencyAddress {
                chain_id: 31337,
                network: "localhost".to_string(),
            }
        );
    }

    #[test]
    fn test_adding_a_network_is_one_entry() {
        let mut registry = NetworkConfigRegistry::new();
        let before = registry.len();
        let feed = Address::from_low_u64_be(0xfeed);

        registry.add_config(NetworkConfig::new(137, "polygon").with_dependency_address(feed));

        assert_eq!(registry.len(), before + 1);
        assert_eq!(registry.dependency_address(137).unwrap(), feed);
        assert_eq!(registry.find_by_name("polygon").unwrap().chain_id, 137);
    }

    #[test]
    fn test_config_deserializes_from_camel_case() {
        let json = r#"{
            "chainId": 5,
            "name": "goerli",
            "dependencyAddress": "0xd4a33860578de61dbabdc8bfdb98fd742fa7028e",
            "blockConfirmations": 6
        }"#;
        let config: NetworkConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config, NetworkConfig::goerli());
    }
}
