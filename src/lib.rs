pub mod artifact;
pub mod config;
pub mod deploy;
pub mod network;
pub mod pipeline;
pub mod store;
pub mod verify;

pub use common::{
    ActiveNetwork, ConfigurationError, DeployError, DeploymentArgs, DeploymentRecord, DeploymentResult, StoreError,
    VerificationError,
};
pub use config::{ConfigManager, DeployConfig};
pub use deploy::{ContractDeployer, DeployReceipt, DeployRequest, DeploymentOrchestrator, EthersDeployer};
pub use network::{DevelopmentChains, NetworkConfig, NetworkConfigRegistry};
pub use pipeline::{DeploymentRun, RunReport, RunState};
pub use store::{DeploymentStore, FileDeploymentStore, MemoryDeploymentStore};
pub use verify::{
    EtherscanClient, SkipReason, SubmissionStatus, VerificationApi, VerificationOutcome, VerificationRequest,
    VerificationService,
};
