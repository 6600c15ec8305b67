// Source verification
//
// Explorer submissions are best effort: the service decides whether to submit
// at all, and classifies what comes back into a small closed set of outcomes.

mod etherscan;
mod service;

pub use etherscan::EtherscanClient;
pub use service::VerificationService;

use async_trait::async_trait;
use common::{ActiveNetwork, DeploymentArgs, VerificationError};
use ethers::types::Address;

/// Status reported by an explorer for a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// Source accepted and matched
    Success,
    /// The contract was verified earlier
    AlreadyVerified,
    /// Still queued on the explorer side
    Pending,
    /// Anything unrecognised, with the raw explorer message
    Failed(String),
}

impl SubmissionStatus {
    /// Classify a raw explorer status string.
    ///
    /// Only a fixed set of spellings is recognised; everything else is a
    /// failure that keeps the raw message for diagnosis.
    pub fn classify(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();

        if normalized == "already_verified" || normalized.contains("already verified") {
            Self::AlreadyVerified
        } else if normalized == "success" || normalized == "pass - verified" {
            Self::Success
        } else if normalized == "pending" || normalized == "pending in queue" {
            Self::Pending
        } else {
            Self::Failed(raw.trim().to_string())
        }
    }
}

/// Why verification was not attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Local networks have no explorer
    DevelopmentNetwork,
    /// No explorer API key configured
    NoCredential,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DevelopmentNetwork => write!(f, "development network"),
            Self::NoCredential => write!(f, "no credential"),
        }
    }
}

/// Successful verification outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Skipped(SkipReason),
    VerifiedNow,
    AlreadyVerified,
}

/// What gets submitted to the explorer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    pub address: Address,
    pub args: DeploymentArgs,
    pub network: ActiveNetwork,
    pub api_key: String,
}

/// Explorer verification endpoint
#[async_trait]
pub trait VerificationApi: Send + Sync {
    /// Submit a contract and return the final status the explorer reports
    async fn submit(&self, request: &VerificationRequest) -> Result<SubmissionStatus, VerificationError>;
}
