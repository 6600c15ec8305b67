// Contract deployment
//
// The deploy capability is a trait so the orchestrator can be driven by a real
// chain client or by a test double.

mod client;
mod orchestrator;

pub use client::EthersDeployer;
pub use orchestrator::{DeploymentOrchestrator, DEFAULT_CONFIRMATIONS, DEFAULT_CONTRACT_NAME, DEFAULT_MOCK_NAME};

use async_trait::async_trait;
use common::{DeployError, DeploymentArgs};
use ethers::types::{Address, H256};

/// A single deployment transaction to submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    /// Deployer account
    pub from: Address,
    /// Constructor arguments
    pub args: DeploymentArgs,
    /// Confirmations to wait for before returning; zero means return once mined
    pub confirmations: u64,
}

/// What the chain reports back for a deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReceipt {
    pub address: Address,
    pub transaction_hash: Option<H256>,
    pub confirmations: u64,
}

/// Submits a contract creation transaction and waits for confirmations
#[async_trait]
pub trait ContractDeployer: Send + Sync {
    async fn deploy(&self, contract_name: &str, request: DeployRequest) -> Result<DeployReceipt, DeployError>;
}
