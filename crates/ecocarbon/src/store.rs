//! Persistence of the [`DeploymentRecord`] between the deploy and interact
//! binaries.

use {
    crate::{Error, record::DeploymentRecord},
    anyhow::Context,
    async_trait::async_trait,
    std::{
        path::{Path, PathBuf},
        sync::Mutex,
    },
};

pub const DEFAULT_PATH: &str = "lacnet-deployment-addresses.json";

#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait DeploymentStore: Send + Sync {
    /// Replaces the stored record.
    async fn save(&self, record: &DeploymentRecord) -> Result<(), Error>;

    /// Fails with [`Error::MissingArtifact`] if no readable record exists.
    async fn load(&self) -> Result<DeploymentRecord, Error>;
}

/// Stores the record as pretty printed JSON in a single file.
pub struct FileDeploymentStore {
    path: PathBuf,
}

impl FileDeploymentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn missing(&self, reason: impl ToString) -> Error {
        Error::MissingArtifact {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl DeploymentStore for FileDeploymentStore {
    async fn save(&self, record: &DeploymentRecord) -> Result<(), Error> {
        let content =
            serde_json::to_string_pretty(record).context("failed to serialize deployment record")?;
        tokio::fs::write(&self.path, content)
            .await
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), "saved deployment record");
        Ok(())
    }

    async fn load(&self) -> Result<DeploymentRecord, Error> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| self.missing(err))?;
        serde_json::from_str(&content).map_err(|err| self.missing(err))
    }
}

/// Keeps the record in memory. Used in tests and dry runs.
#[derive(Default)]
pub struct InMemoryDeploymentStore {
    record: Mutex<Option<DeploymentRecord>>,
}

impl InMemoryDeploymentStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, Option<DeploymentRecord>> {
        // A poisoned lock still holds a consistent record, writes replace it
        // in one assignment.
        self.record
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl DeploymentStore for InMemoryDeploymentStore {
    async fn save(&self, record: &DeploymentRecord) -> Result<(), Error> {
        *self.lock() = Some(record.clone());
        Ok(())
    }

    async fn load(&self) -> Result<DeploymentRecord, Error> {
        self.lock().clone().ok_or_else(|| Error::MissingArtifact {
            path: "memory".to_string(),
            reason: "no deployment recorded".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::record::{ContractAddresses, DEFAULT_NETWORK, LacnetFeatures},
        alloy::primitives::Address,
        chrono::DateTime,
    };

    fn record() -> DeploymentRecord {
        DeploymentRecord {
            timestamp: DateTime::from_timestamp(1_736_899_200, 0).unwrap(),
            network: DEFAULT_NETWORK.to_string(),
            deployer: Address::repeat_byte(1),
            trusted_forwarder: Address::repeat_byte(2),
            lacnet_features: LacnetFeatures::ENABLED,
            contracts: ContractAddresses {
                simple_greeting: Address::repeat_byte(3),
                simple_storage: Address::repeat_byte(4),
                eco_carbon_token: Address::repeat_byte(5),
            },
        }
    }

    #[tokio::test]
    async fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDeploymentStore::new(dir.path().join(DEFAULT_PATH));

        store.save(&record()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), record());

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("\n  \"contracts\": {"));
    }

    #[tokio::test]
    async fn file_store_overwrites_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDeploymentStore::new(dir.path().join(DEFAULT_PATH));
        store.save(&record()).await.unwrap();

        let mut newer = record();
        newer.contracts.simple_greeting = Address::repeat_byte(9);
        store.save(&newer).await.unwrap();

        assert_eq!(store.load().await.unwrap(), newer);
    }

    #[tokio::test]
    async fn absent_file_is_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDeploymentStore::new(dir.path().join("absent.json"));

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, Error::MissingArtifact { .. }));
        assert!(err.to_string().contains("absent.json"));
    }

    #[tokio::test]
    async fn malformed_file_is_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_PATH);
        std::fs::write(&path, r#"{"network": "lacchain_testnet"}"#).unwrap();

        let err = FileDeploymentStore::new(path).load().await.unwrap_err();
        assert!(matches!(err, Error::MissingArtifact { .. }));
    }

    #[tokio::test]
    async fn in_memory_store() {
        let store = InMemoryDeploymentStore::default();
        assert!(matches!(
            store.load().await,
            Err(Error::MissingArtifact { .. })
        ));

        store.save(&record()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), record());
    }
}
