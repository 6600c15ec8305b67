use common::{ActiveNetwork, ConfigurationError, DeployError, DeploymentArgs, DeploymentRecord, DeploymentResult};
use ethers::types::Address;
use ethers::utils::to_checksum;
use log::{debug, info, warn};

use super::{ContractDeployer, DeployRequest};
use crate::network::{DevelopmentChains, NetworkConfigRegistry};
use crate::store::DeploymentStore;

/// Confirmations to wait for on live networks when nothing else is configured.
/// Explorers often fail to find contracts verified sooner than this.
pub const DEFAULT_CONFIRMATIONS: u64 = 5;

pub const DEFAULT_CONTRACT_NAME: &str = "FundMe";

pub const DEFAULT_MOCK_NAME: &str = "MockV3Aggregator";

/// Resolves constructor arguments for the target network and deploys the
/// contract exactly once per call
pub struct DeploymentOrchestrator<D, S> {
    registry: NetworkConfigRegistry,
    development_chains: DevelopmentChains,
    deployer: D,
    store: S,
    contract_name: String,
    mock_name: String,
}

impl<D: ContractDeployer, S: DeploymentStore> DeploymentOrchestrator<D, S> {
    pub fn new(registry: NetworkConfigRegistry, development_chains: DevelopmentChains, deployer: D, store: S) -> Self {
        Self {
            registry,
            development_chains,
            deployer,
            store,
            contract_name: DEFAULT_CONTRACT_NAME.to_string(),
            mock_name: DEFAULT_MOCK_NAME.to_string(),
        }
    }

    /// Deploy a different contract
    pub fn with_contract_name(mut self, name: impl Into<String>) -> Self {
        self.contract_name = name.into();
        self
    }

    /// Look up a differently named mock on development networks
    pub fn with_mock_name(mut self, name: impl Into<String>) -> Self {
        self.mock_name = name.into();
        self
    }

    pub fn is_development(&self, network: &ActiveNetwork) -> bool {
        self.development_chains.contains(&network.name)
    }

    /// Address of the price feed the contract is constructed with.
    ///
    /// Development networks use the most recently recorded mock; every other
    /// network must have a statically configured address.
    pub fn resolve_dependency(&self, network: &ActiveNetwork) -> Result<Address, DeployError> {
        if self.is_development(network) {
            let record = self.store.latest(&network.name, &self.mock_name)?.ok_or_else(|| {
                ConfigurationError::MissingMock {
                    mock: self.mock_name.clone(),
                    contract: self.contract_name.clone(),
                    network: network.name.clone(),
                }
            })?;
            debug!("Using {} at {:?} on {}", self.mock_name, record.address, network.name);
            return Ok(record.address);
        }

        Ok(self.registry.dependency_address(network.chain_id)?)
    }

    /// Confirmations to request: none on development networks, otherwise the
    /// explicit policy, then the network's recommendation, then the default
    pub fn confirmations_for(&self, network: &ActiveNetwork, policy: Option<u64>) -> u64 {
        if self.is_development(network) {
            return 0;
        }

        policy
            .or(network.block_confirmations)
            .unwrap_or(DEFAULT_CONFIRMATIONS)
    }

    /// Deploy the contract to `network` from `deployer`.
    ///
    /// Configuration errors are returned before anything is submitted. A
    /// failed or timed-out submission is returned as is and never retried.
    pub async fn deploy(
        &self,
        network: &ActiveNetwork,
        deployer: Address,
        confirmation_policy: Option<u64>,
    ) -> Result<DeploymentResult, DeployError> {
        let dependency = self.resolve_dependency(network)?;
        let args = DeploymentArgs::new(vec![dependency]);
        let confirmations = self.confirmations_for(network, confirmation_policy);

        info!("----------------------------------------------------");
        info!(
            "Deploying {} to {} (chain {}) and waiting for {} confirmations...",
            self.contract_name, network.name, network.chain_id, confirmations
        );

        let request = DeployRequest {
            from: deployer,
            args: args.clone(),
            confirmations,
        };
        let receipt = self.deployer.deploy(&self.contract_name, request).await?;

        info!("{} deployed at {}", self.contract_name, to_checksum(&receipt.address, None));

        let result = DeploymentResult {
            contract_name: self.contract_name.clone(),
            address: receipt.address,
            transaction_hash: receipt.transaction_hash,
            confirmations: receipt.confirmations,
            args,
        };

        // The contract is on chain at this point; a bookkeeping failure must not
        // turn the run into a failure
        if let Err(e) = self.store.append(DeploymentRecord::from_result(&result, &network.name)) {
            warn!("Failed to record {} deployment: {}", self.contract_name, e);
        }

        Ok(result)
    }
}
