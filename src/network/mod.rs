mod registry;

pub use registry::{NetworkConfig, NetworkConfigRegistry};

use std::collections::HashSet;

/// Names of the local, ephemeral networks that get a mock price feed and are
/// never verified
pub const DEFAULT_DEVELOPMENT_CHAINS: &[&str] = &["hardhat", "localhost"];

/// Membership predicate for development networks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevelopmentChains {
    names: HashSet<String>,
}

impl DevelopmentChains {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, network: &str) -> bool {
        self.names.contains(network)
    }
}

impl Default for DevelopmentChains {
    fn default() -> Self {
        Self::new(DEFAULT_DEVELOPMENT_CHAINS.iter().copied())
    }
}
