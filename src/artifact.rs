// Compiled contract artifacts
//
// Reads the artifacts a Hardhat build leaves under `artifacts/`: the contract
// JSON for ABI and bytecode, and the build-info it points to for the compiler
// version and standard-JSON input needed by source verification.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use ethers::abi::Abi;
use ethers::types::Bytes;
use serde::Deserialize;

const BUILD_INFO_DIR: &str = "build-info";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactFile {
    contract_name: String,
    source_name: String,
    abi: Abi,
    bytecode: Bytes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugFile {
    build_info: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildInfoFile {
    solc_long_version: String,
    input: serde_json::Value,
}

/// ABI and creation bytecode of a compiled contract
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub source_name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
    /// Path of the artifact JSON this was loaded from
    pub path: PathBuf,
}

/// Everything an explorer needs besides the address and constructor args
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationSource {
    /// Fully qualified name, e.g. `contracts/FundMe.sol:FundMe`
    pub contract_identifier: String,
    /// Compiler version in explorer format, e.g. `v0.8.7+commit.e28d00a7`
    pub compiler_version: String,
    /// Solidity standard-JSON compiler input
    pub standard_json_input: String,
}

impl ContractArtifact {
    /// Find and load `<contract_name>.json` anywhere under `artifacts_dir`
    pub fn load<P: AsRef<Path>>(artifacts_dir: P, contract_name: &str) -> Result<Self> {
        let artifacts_dir = artifacts_dir.as_ref();
        let file_name = format!("{}.json", contract_name);
        let path = find_file(artifacts_dir, &file_name)?.ok_or_else(|| {
            anyhow!(
                "No artifact for {} under {}; compile the contracts first",
                contract_name,
                artifacts_dir.display()
            )
        })?;

        Self::from_file(path)
    }

    /// Load an artifact from an explicit path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read artifact {}", path.display()))?;
        let artifact: ArtifactFile = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse artifact {}", path.display()))?;

        if artifact.bytecode.is_empty() {
            return Err(anyhow!(
                "{} has no bytecode (abstract contract or interface?)",
                artifact.contract_name
            ));
        }

        Ok(Self {
            contract_name: artifact.contract_name,
            source_name: artifact.source_name,
            abi: artifact.abi,
            bytecode: artifact.bytecode,
            path: path.to_path_buf(),
        })
    }

    /// Resolve the build-info next to this artifact into a verification source
    pub fn verification_source(&self) -> Result<VerificationSource> {
        let dbg_path = self.path.with_extension("dbg.json");
        let dbg: DebugFile = serde_json::from_str(
            &fs::read_to_string(&dbg_path)
                .with_context(|| format!("Failed to read {}", dbg_path.display()))?,
        )?;

        // build_info is relative to the directory holding the dbg file
        let base = dbg_path.parent().unwrap_or_else(|| Path::new("."));
        let build_info_path = base.join(&dbg.build_info);
        let build_info: BuildInfoFile = serde_json::from_str(
            &fs::read_to_string(&build_info_path)
                .with_context(|| format!("Failed to read build info {}", build_info_path.display()))?,
        )?;

        Ok(VerificationSource {
            contract_identifier: format!("{}:{}", self.source_name, self.contract_name),
            compiler_version: format!("v{}", build_info.solc_long_version.trim_start_matches('v')),
            standard_json_input: serde_json::to_string(&build_info.input)?,
        })
    }
}

fn find_file(dir: &Path, file_name: &str) -> Result<Option<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read artifacts directory {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            if path.file_name().map_or(false, |name| name == BUILD_INFO_DIR) {
                continue;
            }
            if let Some(found) = find_file(&path, file_name)? {
                return Ok(Some(found));
            }
        } else if path.file_name().map_or(false, |name| name == file_name) {
            return Ok(Some(path));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_hardhat_layout(root: &Path) -> Result<()> {
        let contract_dir = root.join("contracts").join("FundMe.sol");
        fs::create_dir_all(&contract_dir)?;
        fs::create_dir_all(root.join(BUILD_INFO_DIR))?;

        fs::write(
            contract_dir.join("FundMe.json"),
            r#"{
                "_format": "hh-sol-artifact-1",
                "contractName": "FundMe",
                "sourceName": "contracts/FundMe.sol",
                "abi": [{
                    "type": "constructor",
                    "stateMutability": "nonpayable",
                    "inputs": [{"name": "priceFeed", "type": "address", "internalType": "address"}]
                }],
                "bytecode": "0x6080604052",
                "deployedBytecode": "0x6080",
                "linkReferences": {},
                "deployedLinkReferences": {}
            }"#,
        )?;
        fs::write(
            contract_dir.join("FundMe.dbg.json"),
            r#"{"_format": "hh-sol-dbg-1", "buildInfo": "../../build-info/abc123.json"}"#,
        )?;
        fs::write(
            root.join(BUILD_INFO_DIR).join("abc123.json"),
            r#"{
                "id": "abc123",
                "solcVersion": "0.8.7",
                "solcLongVersion": "0.8.7+commit.e28d00a7",
                "input": {"language": "Solidity", "sources": {}}
            }"#,
        )?;
        Ok(())
    }

    #[test]
    fn test_load_finds_nested_artifact() -> Result<()> {
        let dir = tempdir()?;
        write_hardhat_layout(dir.path())?;

        let artifact = ContractArtifact::load(dir.path(), "FundMe")?;
        assert_eq!(artifact.contract_name, "FundMe");
        assert_eq!(artifact.source_name, "contracts/FundMe.sol");
        assert!(artifact.abi.constructor().is_some());
        assert_eq!(artifact.bytecode.to_vec(), vec![0x60, 0x80, 0x60, 0x40, 0x52]);
        Ok(())
    }

    #[test]
    fn test_verification_source_from_build_info() -> Result<()> {
        let dir = tempdir()?;
        write_hardhat_layout(dir.path())?;

        let source = ContractArtifact::load(dir.path(), "FundMe")?.verification_source()?;
        assert_eq!(source.contract_identifier, "contracts/FundMe.sol:FundMe");
        assert_eq!(source.compiler_version, "v0.8.7+commit.e28d00a7");
        assert!(source.standard_json_input.contains("Solidity"));
        Ok(())
    }

    #[test]
    fn test_missing_artifact() -> Result<()> {
        let dir = tempdir()?;
        write_hardhat_layout(dir.path())?;

        let err = ContractArtifact::load(dir.path(), "MockV3Aggregator").unwrap_err();
        assert!(err.to_string().contains("No artifact for MockV3Aggregator"));
        Ok(())
    }
}
