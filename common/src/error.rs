use ethers::types::Address;
use thiserror::Error;

/// Precondition failures detected before any transaction is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("unknown network: chain id {chain_id} has no configuration entry")]
    UnknownNetwork { chain_id: u64 },

    #[error("network {network} (chain id {chain_id}) has no dependency address configured")]
    MissingDependencyAddress { chain_id: u64, network: String },

    #[error("mock {mock} has not been deployed on {network}; deploy mocks before {contract}")]
    MissingMock {
        mock: String,
        contract: String,
        network: String,
    },
}

/// Errors from the deployment record store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed deployment record: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Fatal deployment errors. None of these are retried.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("deployment record store failed: {0}")]
    Store(#[from] StoreError),

    #[error("deployment of {contract} failed: {reason}")]
    Failure { contract: String, reason: String },

    #[error("deployment of {contract} timed out after {timeout_secs}s waiting for {confirmations} confirmations")]
    Timeout {
        contract: String,
        confirmations: u64,
        timeout_secs: u64,
    },
}

impl DeployError {
    /// Whether the run was aborted before anything was submitted
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Store(_))
    }
}

/// Non-fatal verification errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("explorer rejected verification of {address:?}: {message}")]
    Rejected { address: Address, message: String },

    #[error("verification of {address:?} was still pending when status checks ran out")]
    StillPending { address: Address },

    #[error("verification request failed: {0}")]
    Request(String),
}
