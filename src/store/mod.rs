// Deployment record store
//
// Append-only history of deployments keyed by contract name and network.
// Mock dependencies are looked up here by name on development networks.

mod file;

pub use file::FileDeploymentStore;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use common::{DeploymentRecord, StoreError};

/// Storage for deployment records
pub trait DeploymentStore: Send + Sync {
    /// Most recently recorded deployment of `contract_name` on `network`
    fn latest(&self, network: &str, contract_name: &str) -> Result<Option<DeploymentRecord>, StoreError>;

    /// Record a deployment. Earlier records for the same key are kept.
    fn append(&self, record: DeploymentRecord) -> Result<(), StoreError>;
}

impl<T: DeploymentStore + ?Sized> DeploymentStore for std::sync::Arc<T> {
    fn latest(&self, network: &str, contract_name: &str) -> Result<Option<DeploymentRecord>, StoreError> {
        (**self).latest(network, contract_name)
    }

    fn append(&self, record: DeploymentRecord) -> Result<(), StoreError> {
        (**self).append(record)
    }
}

/// In-memory store, used for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryDeploymentStore {
    records: Mutex<HashMap<(String, String), Vec<DeploymentRecord>>>,
}

impl MemoryDeploymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records for a key, oldest first
    pub fn history(&self, network: &str, contract_name: &str) -> Vec<DeploymentRecord> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records
            .get(&(network.to_string(), contract_name.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

impl DeploymentStore for MemoryDeploymentStore {
    fn latest(&self, network: &str, contract_name: &str) -> Result<Option<DeploymentRecord>, StoreError> {
        Ok(self.history(network, contract_name).pop())
    }

    fn append(&self, record: DeploymentRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records
            .entry((record.network.clone(), record.contract_name.clone()))
            .or_default()
            .push(record);
        Ok(())
    }
}
