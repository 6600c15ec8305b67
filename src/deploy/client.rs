use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::DeployError;
use ethers::contract::ContractFactory;
use ethers::providers::Middleware;
use log::debug;

use super::{ContractDeployer, DeployReceipt, DeployRequest};
use crate::artifact::ContractArtifact;

/// Deploys a compiled artifact through an ethers middleware stack.
///
/// Signing and nonce management belong to the middleware: a
/// `SignerMiddleware` on live networks, the node's unlocked accounts on a
/// local Hardhat node.
pub struct EthersDeployer<M> {
    client: Arc<M>,
    artifact: ContractArtifact,
    timeout: Duration,
}

impl<M: Middleware + 'static> EthersDeployer<M> {
    pub fn new(client: Arc<M>, artifact: ContractArtifact, timeout: Duration) -> Self {
        Self {
            client,
            artifact,
            timeout,
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static> ContractDeployer for EthersDeployer<M> {
    async fn deploy(&self, contract_name: &str, request: DeployRequest) -> Result<DeployReceipt, DeployError> {
        let failure = |reason: String| DeployError::Failure {
            contract: contract_name.to_string(),
            reason,
        };

        let factory = ContractFactory::new(
            self.artifact.abi.clone(),
            self.artifact.bytecode.clone(),
            self.client.clone(),
        );

        let mut deployer = factory
            .deploy_tokens(request.args.to_tokens())
            .map_err(|e| failure(e.to_string()))?;
        deployer.tx.set_from(request.from);

        // A receipt only exists once the transaction is mined, so one
        // confirmation is the floor even when none were asked for
        let confirmations = request.confirmations.max(1);
        let deployer = deployer.confirmations(usize::try_from(confirmations).unwrap_or(usize::MAX));

        debug!("Submitting {} creation transaction from {:?}", contract_name, request.from);

        let (contract, receipt) = tokio::time::timeout(self.timeout, deployer.send_with_receipt())
            .await
            .map_err(|_| DeployError::Timeout {
                contract: contract_name.to_string(),
                confirmations: request.confirmations,
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|e| failure(e.to_string()))?;

        Ok(DeployReceipt {
            address: contract.address(),
            transaction_hash: Some(receipt.transaction_hash),
            confirmations: request.confirmations,
        })
    }
}
