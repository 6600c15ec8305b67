use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use common::{DeploymentArgs, DeploymentRecord, StoreError};
use ethers::types::{Address, H256};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DeploymentStore;

/// One deployment as hardhat-deploy lays it out. Only `address` is required;
/// fields this crate does not use (`abi`, `receipt`, ...) are ignored.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDeployment {
    address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transaction_hash: Option<H256>,
    /// Constructor arguments in whatever form the writer used
    #[serde(default)]
    args: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deployed_at: Option<DateTime<Utc>>,
}

/// On-disk layout of `<root>/<network>/<ContractName>.json`
#[derive(Debug, Serialize, Deserialize)]
struct DeploymentFile {
    #[serde(flatten)]
    latest: StoredDeployment,
    /// Earlier deployments, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    history: Vec<StoredDeployment>,
}

impl From<&DeploymentRecord> for StoredDeployment {
    fn from(record: &DeploymentRecord) -> Self {
        Self {
            address: record.address,
            transaction_hash: record.transaction_hash,
            args: record
                .args
                .as_slice()
                .iter()
                .map(|address| Value::String(format!("{:?}", address)))
                .collect(),
            deployed_at: Some(record.deployed_at),
        }
    }
}

impl StoredDeployment {
    fn into_record(self, contract_name: &str, network: &str, modified: DateTime<Utc>) -> DeploymentRecord {
        // Mocks take numeric arguments; only all-address lists are kept
        let args = serde_json::from_value::<Vec<Address>>(Value::Array(self.args))
            .map(DeploymentArgs::new)
            .unwrap_or_default();

        DeploymentRecord {
            contract_name: contract_name.to_string(),
            network: network.to_string(),
            address: self.address,
            transaction_hash: self.transaction_hash,
            args,
            deployed_at: self.deployed_at.unwrap_or(modified),
        }
    }
}

/// Deployment store over a hardhat-deploy style `deployments/` directory.
///
/// Files written by hardhat-deploy are read as-is; the contract name and
/// network come from the path.
#[derive(Debug, Clone)]
pub struct FileDeploymentStore {
    root: PathBuf,
}

impl FileDeploymentStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn record_path(&self, network: &str, contract_name: &str) -> PathBuf {
        self.root.join(network).join(format!("{}.json", contract_name))
    }

    fn read(&self, path: &Path) -> Result<Option<(DeploymentFile, DateTime<Utc>)>, StoreError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file = serde_json::from_str(&contents)?;
        let modified = fs::metadata(path)?.modified()?;
        Ok(Some((file, DateTime::<Utc>::from(modified))))
    }
}

impl DeploymentStore for FileDeploymentStore {
    fn latest(&self, network: &str, contract_name: &str) -> Result<Option<DeploymentRecord>, StoreError> {
        let path = self.record_path(network, contract_name);
        Ok(self
            .read(&path)?
            .map(|(file, modified)| file.latest.into_record(contract_name, network, modified)))
    }

    fn append(&self, record: DeploymentRecord) -> Result<(), StoreError> {
        let path = self.record_path(&record.network, &record.contract_name);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let latest = StoredDeployment::from(&record);
        let file = match self.read(&path)? {
            Some((mut existing, _)) => {
                existing.history.push(existing.latest);
                DeploymentFile {
                    latest,
                    history: existing.history,
                }
            }
            None => DeploymentFile {
                latest,
                history: Vec::new(),
            },
        };

        // Write then rename so a crash never leaves a truncated record
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&file)?)?;
        fs::rename(&tmp, &path)?;

        debug!("Recorded deployment at {}", path.display());
        Ok(())
    }
}
