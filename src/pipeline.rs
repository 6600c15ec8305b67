// Deployment run
//
// Deploys, then verifies. Deployment success is authoritative; verification
// only annotates the report.

use common::{ActiveNetwork, DeployError, DeploymentResult, VerificationError};
use ethers::types::Address;
use log::{info, warn};

use crate::deploy::{ContractDeployer, DeploymentOrchestrator};
use crate::store::DeploymentStore;
use crate::verify::{SkipReason, VerificationApi, VerificationOutcome, VerificationService};

/// Lifecycle of a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Pending,
    /// Deployed and confirmed
    Deployed,
    Skipped(SkipReason),
    VerifiedNow,
    AlreadyVerified,
    VerificationFailed(String),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Deployed)
    }

    /// Whether `self -> next` is a legal transition
    pub fn can_transition_to(&self, next: &RunState) -> bool {
        match (self, next) {
            (Self::Pending, Self::Deployed) => true,
            (Self::Deployed, next) => next.is_terminal(),
            _ => false,
        }
    }

    fn from_verification(result: Result<VerificationOutcome, VerificationError>) -> Self {
        match result {
            Ok(VerificationOutcome::Skipped(reason)) => Self::Skipped(reason),
            Ok(VerificationOutcome::VerifiedNow) => Self::VerifiedNow,
            Ok(VerificationOutcome::AlreadyVerified) => Self::AlreadyVerified,
            Err(e) => Self::VerificationFailed(e.to_string()),
        }
    }
}

/// Result of a run that got past deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub deployment: DeploymentResult,
    /// Always terminal
    pub state: RunState,
}

impl RunReport {
    pub fn is_verified(&self) -> bool {
        matches!(self.state, RunState::VerifiedNow | RunState::AlreadyVerified)
    }
}

pub struct DeploymentRun<D, S, A> {
    orchestrator: DeploymentOrchestrator<D, S>,
    verifier: VerificationService<A>,
}

impl<D, S, A> DeploymentRun<D, S, A>
where
    D: ContractDeployer,
    S: DeploymentStore,
    A: VerificationApi,
{
    pub fn new(orchestrator: DeploymentOrchestrator<D, S>, verifier: VerificationService<A>) -> Self {
        Self {
            orchestrator,
            verifier,
        }
    }

    /// Deploy and then verify.
    ///
    /// Returns an error only when deployment fails. Verification errors are
    /// logged and reported through [`RunState::VerificationFailed`].
    pub async fn execute(
        &self,
        network: &ActiveNetwork,
        deployer: Address,
        confirmation_policy: Option<u64>,
    ) -> Result<RunReport, DeployError> {
        let mut state = RunState::Pending;

        let deployment = self
            .orchestrator
            .deploy(network, deployer, confirmation_policy)
            .await?;
        advance(&mut state, RunState::Deployed);

        let verification = self
            .verifier
            .verify(deployment.address, &deployment.args, network)
            .await;
        if let Err(e) = &verification {
            warn!("Verification failed, deployment is unaffected: {}", e);
        }
        advance(&mut state, RunState::from_verification(verification));

        Ok(RunReport { deployment, state })
    }
}

fn advance(state: &mut RunState, next: RunState) {
    debug_assert!(state.can_transition_to(&next), "illegal transition {:?} -> {:?}", state, next);
    info!("Run state: {:?} -> {:?}", state, next);
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_only_follow_deployed() {
        let terminals = [
            RunState::Skipped(SkipReason::NoCredential),
            RunState::VerifiedNow,
            RunState::AlreadyVerified,
            RunState::VerificationFailed("boom".to_string()),
        ];

        for terminal in &terminals {
            assert!(terminal.is_terminal());
            assert!(RunState::Deployed.can_transition_to(terminal));
            assert!(!RunState::Pending.can_transition_to(terminal));
            assert!(!terminal.can_transition_to(&RunState::Pending));
        }
    }

    #[test]
    fn test_no_way_back_to_pending() {
        assert!(RunState::Pending.can_transition_to(&RunState::Deployed));
        assert!(!RunState::Deployed.can_transition_to(&RunState::Pending));
        assert!(!RunState::Deployed.can_transition_to(&RunState::Deployed));
    }

    #[test]
    fn test_verification_error_becomes_failed_state() {
        let state = RunState::from_verification(Err(VerificationError::Request("timeout".to_string())));
        assert_eq!(
            state,
            RunState::VerificationFailed("verification request failed: timeout".to_string())
        );
    }
}
