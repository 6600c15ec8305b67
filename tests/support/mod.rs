//! Test doubles for the chain and explorer collaborators.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ethers::types::{Address, H256};
use fundme_deploy::{
    ContractDeployer, DeployError, DeployReceipt, DeployRequest, DeploymentOrchestrator, DeploymentRun,
    DeploymentStore, DevelopmentChains, MemoryDeploymentStore, NetworkConfigRegistry, SubmissionStatus, VerificationApi,
    VerificationError, VerificationRequest, VerificationService,
};

/// Address every successful fake deployment lands at
pub const DEPLOYED_AT: u64 = 0xf00d;

/// Records deployment requests and answers with a fixed outcome
#[derive(Clone, Default)]
pub struct FakeDeployer {
    requests: Arc<Mutex<Vec<(String, DeployRequest)>>>,
    failure: Option<String>,
}

impl FakeDeployer {
    pub fn failing(reason: &str) -> Self {
        Self {
            requests: Arc::default(),
            failure: Some(reason.to_string()),
        }
    }

    pub fn requests(&self) -> Vec<(String, DeployRequest)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContractDeployer for FakeDeployer {
    async fn deploy(&self, contract_name: &str, request: DeployRequest) -> Result<DeployReceipt, DeployError> {
        let confirmations = request.confirmations;
        self.requests
            .lock()
            .unwrap()
            .push((contract_name.to_string(), request));

        match &self.failure {
            Some(reason) => Err(DeployError::Failure {
                contract: contract_name.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(DeployReceipt {
                address: Address::from_low_u64_be(DEPLOYED_AT),
                transaction_hash: Some(H256::from_low_u64_be(1)),
                confirmations,
            }),
        }
    }
}

/// Explorer that answers every submission with the same status
#[derive(Clone)]
pub struct FakeExplorer {
    status: Result<SubmissionStatus, VerificationError>,
    submissions: Arc<Mutex<Vec<VerificationRequest>>>,
}

impl FakeExplorer {
    pub fn answering(status: SubmissionStatus) -> Self {
        Self {
            status: Ok(status),
            submissions: Arc::default(),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            status: Err(VerificationError::Request("connection refused".to_string())),
            submissions: Arc::default(),
        }
    }

    pub fn submissions(&self) -> Vec<VerificationRequest> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl VerificationApi for FakeExplorer {
    async fn submit(&self, request: &VerificationRequest) -> Result<SubmissionStatus, VerificationError> {
        self.submissions.lock().unwrap().push(request.clone());
        self.status.clone()
    }
}

pub type TestRun = DeploymentRun<FakeDeployer, Arc<MemoryDeploymentStore>, FakeExplorer>;

/// Wire a full run around the given doubles
pub fn run_with(
    deployer: FakeDeployer,
    store: Arc<MemoryDeploymentStore>,
    explorer: FakeExplorer,
    credential: Option<&str>,
) -> TestRun {
    run_with_store(deployer, store, explorer, credential)
}

/// Same as [`run_with`] over any record store
pub fn run_with_store<S: DeploymentStore>(
    deployer: FakeDeployer,
    store: S,
    explorer: FakeExplorer,
    credential: Option<&str>,
) -> DeploymentRun<FakeDeployer, S, FakeExplorer> {
    let orchestrator = DeploymentOrchestrator::new(
        NetworkConfigRegistry::new(),
        DevelopmentChains::default(),
        deployer,
        store,
    );
    let verifier = VerificationService::new(
        explorer,
        credential.map(str::to_string),
        DevelopmentChains::default(),
    );
    DeploymentRun::new(orchestrator, verifier)
}
