use common::{ActiveNetwork, DeploymentArgs, VerificationError};
use ethers::types::Address;
use log::{info, warn};

use super::{SkipReason, SubmissionStatus, VerificationApi, VerificationOutcome, VerificationRequest};
use crate::network::DevelopmentChains;

/// Decides whether a deployment is submitted for verification and interprets
/// the explorer's answer
pub struct VerificationService<A> {
    api: A,
    credential: Option<String>,
    development_chains: DevelopmentChains,
}

impl<A: VerificationApi> VerificationService<A> {
    pub fn new(api: A, credential: Option<String>, development_chains: DevelopmentChains) -> Self {
        // An empty key is as good as none
        let credential = credential.filter(|key| !key.trim().is_empty());
        Self {
            api,
            credential,
            development_chains,
        }
    }

    /// Verify the contract at `address`.
    ///
    /// Development networks and a missing credential are skipped without
    /// touching the explorer. "Already verified" counts as success.
    pub async fn verify(
        &self,
        address: Address,
        args: &DeploymentArgs,
        network: &ActiveNetwork,
    ) -> Result<VerificationOutcome, VerificationError> {
        if self.development_chains.contains(&network.name) {
            return Ok(VerificationOutcome::Skipped(SkipReason::DevelopmentNetwork));
        }

        let Some(api_key) = &self.credential else {
            return Ok(VerificationOutcome::Skipped(SkipReason::NoCredential));
        };

        info!("Verifying contract {:?} on {}...", address, network.name);

        let request = VerificationRequest {
            address,
            args: args.clone(),
            network: network.clone(),
            api_key: api_key.clone(),
        };

        match self.api.submit(&request).await? {
            SubmissionStatus::Success => Ok(VerificationOutcome::VerifiedNow),
            SubmissionStatus::AlreadyVerified => {
                info!("Contract {:?} is already verified", address);
                Ok(VerificationOutcome::AlreadyVerified)
            }
            SubmissionStatus::Pending => Err(VerificationError::StillPending { address }),
            SubmissionStatus::Failed(message) => {
                warn!("Explorer rejected verification of {:?}: {}", address, message);
                Err(VerificationError::Rejected { address, message })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedStatus {
        status: SubmissionStatus,
        calls: AtomicUsize,
    }

    impl FixedStatus {
        fn new(status: SubmissionStatus) -> Self {
            Self {
                status,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl VerificationApi for FixedStatus {
        async fn submit(&self, _request: &VerificationRequest) -> Result<SubmissionStatus, VerificationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.status.clone())
        }
    }

    fn goerli() -> ActiveNetwork {
        ActiveNetwork::new(5, "goerli")
    }

    #[tokio::test]
    async fn test_development_network_is_checked_before_credential() {
        let service = VerificationService::new(FixedStatus::new(SubmissionStatus::Success), None, DevelopmentChains::default());

        let outcome = service
            .verify(Address::zero(), &DeploymentArgs::default(), &ActiveNetwork::new(31337, "hardhat"))
            .await
            .unwrap();

        assert_eq!(outcome, VerificationOutcome::Skipped(SkipReason::DevelopmentNetwork));
        assert_eq!(service.api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_credential_is_skipped() {
        let service = VerificationService::new(
            FixedStatus::new(SubmissionStatus::Success),
            Some("  ".to_string()),
            DevelopmentChains::default(),
        );

        let outcome = service
            .verify(Address::zero(), &DeploymentArgs::default(), &goerli())
            .await
            .unwrap();

        assert_eq!(outcome, VerificationOutcome::Skipped(SkipReason::NoCredential));
        assert_eq!(service.api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_is_verified_now() {
        let service = VerificationService::new(
            FixedStatus::new(SubmissionStatus::Success),
            Some("KEY".to_string()),
            DevelopmentChains::default(),
        );

        let outcome = service
            .verify(Address::zero(), &DeploymentArgs::default(), &goerli())
            .await
            .unwrap();

        assert_eq!(outcome, VerificationOutcome::VerifiedNow);
        assert_eq!(service.api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_raw_message() {
        let service = VerificationService::new(
            FixedStatus::new(SubmissionStatus::Failed("Fail - Unable to verify".to_string())),
            Some("KEY".to_string()),
            DevelopmentChains::default(),
        );

        let err = service
            .verify(Address::zero(), &DeploymentArgs::default(), &goerli())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            VerificationError::Rejected {
                address: Address::zero(),
                message: "Fail - Unable to verify".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_pending_after_polling_is_still_pending() {
        let address = Address::from_low_u64_be(0xf00d);
        let service = VerificationService::new(
            FixedStatus::new(SubmissionStatus::Pending),
            Some("KEY".to_string()),
            DevelopmentChains::default(),
        );

        let err = service
            .verify(address, &DeploymentArgs::default(), &goerli())
            .await
            .unwrap_err();

        assert_eq!(err, VerificationError::StillPending { address });
        assert_eq!(service.api.calls.load(Ordering::SeqCst), 1);
    }
}
