pub mod error;

pub use error::{ConfigurationError, DeployError, StoreError, VerificationError};

use chrono::{DateTime, Utc};
use ethers::abi::{self, Token};
use ethers::types::{Address, H256};
use serde::{Deserialize, Serialize};

/// Identity of the network a run targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveNetwork {
    /// EIP-155 chain id
    pub chain_id: u64,
    /// Network name, used for development-chain membership
    pub name: String,
    /// Recommended confirmation count for this network, if any
    pub block_confirmations: Option<u64>,
}

impl ActiveNetwork {
    pub fn new(chain_id: u64, name: impl Into<String>) -> Self {
        Self {
            chain_id,
            name: name.into(),
            block_confirmations: None,
        }
    }

    pub fn with_block_confirmations(mut self, confirmations: u64) -> Self {
        self.block_confirmations = Some(confirmations);
        self
    }
}

/// Ordered constructor arguments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentArgs(Vec<Address>);

impl DeploymentArgs {
    pub fn new(args: Vec<Address>) -> Self {
        Self(args)
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// ABI tokens in constructor order
    pub fn to_tokens(&self) -> Vec<Token> {
        self.0.iter().map(|address| Token::Address(*address)).collect()
    }

    /// ABI-encoded constructor arguments as hex without the `0x` prefix,
    /// the form explorers expect
    pub fn encode_hex(&self) -> String {
        hex::encode(abi::encode(&self.to_tokens()))
    }
}

impl From<Vec<Address>> for DeploymentArgs {
    fn from(args: Vec<Address>) -> Self {
        Self(args)
    }
}

/// Outcome of a successful deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResult {
    pub contract_name: String,
    pub address: Address,
    pub transaction_hash: Option<H256>,
    /// Confirmations observed before returning
    pub confirmations: u64,
    pub args: DeploymentArgs,
}

/// Entry in the deployment record store, keyed by contract name and network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub contract_name: String,
    pub network: String,
    pub address: Address,
    #[serde(default)]
    pub transaction_hash: Option<H256>,
    #[serde(default)]
    pub args: DeploymentArgs,
    pub deployed_at: DateTime<Utc>,
}

impl DeploymentRecord {
    pub fn new(contract_name: impl Into<String>, network: impl Into<String>, address: Address) -> Self {
        Self {
            contract_name: contract_name.into(),
            network: network.into(),
            address,
            transaction_hash: None,
            args: DeploymentArgs::default(),
            deployed_at: Utc::now(),
        }
    }

    pub fn from_result(result: &DeploymentResult, network: &str) -> Self {
        Self {
            contract_name: result.contract_name.clone(),
            network: network.to_string(),
            address: result.address,
            transaction_hash: result.transaction_hash,
            args: result.args.clone(),
            deployed_at: Utc::now(),
        }
    }
}
