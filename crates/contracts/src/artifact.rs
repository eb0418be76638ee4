//! Loading of compiled hardhat artifacts.
//!
//! Hardhat writes one JSON file per contract to
//! `<artifacts>/contracts/<Name>.sol/<Name>.json`. Only the fields needed to
//! deploy a contract are read.

use {
    alloy::primitives::Bytes,
    anyhow::{Context, Result, ensure},
    serde::Deserialize,
    std::path::{Path, PathBuf},
};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    pub source_name: String,
    /// Creation bytecode without constructor arguments.
    pub bytecode: Bytes,
}

impl Artifact {
    /// Location of the artifact of `contract` inside a hardhat artifacts
    /// directory.
    pub fn path(artifacts_dir: &Path, contract: &str) -> PathBuf {
        artifacts_dir
            .join("contracts")
            .join(format!("{contract}.sol"))
            .join(format!("{contract}.json"))
    }

    pub fn load(artifacts_dir: &Path, contract: &str) -> Result<Self> {
        let path = Self::path(artifacts_dir, contract);
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read artifact {}", path.display()))?;
        let artifact: Self = serde_json::from_str(&json)
            .with_context(|| format!("malformed artifact {}", path.display()))?;
        ensure!(
            artifact.contract_name == contract,
            "artifact {} describes {} instead of {contract}",
            path.display(),
            artifact.contract_name,
        );
        ensure!(
            !artifact.bytecode.is_empty(),
            "artifact {} has no creation bytecode",
            path.display(),
        );
        Ok(artifact)
    }

    /// Creation code with the ABI encoded constructor arguments appended.
    pub fn deploy_code(&self, constructor_args: &[u8]) -> Bytes {
        [self.bytecode.as_ref(), constructor_args].concat().into()
    }
}
