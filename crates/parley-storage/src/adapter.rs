// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use parley_config::model::StorageConfig;
use parley_core::{
    AdapterType, HealthStatus, Identity, LinkKind, MessageRef, ParleyError, PluginAdapter,
    StorageAdapter, UserProfile,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
/// The database is opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns the underlying Database, or an error if not initialized.
    pub fn database(&self) -> Result<&Database, ParleyError> {
        self.db.get().ok_or_else(|| ParleyError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        let db = self.database()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ParleyError> {
        let path = self.config.database_path.clone();
        if let Some(parent) = std::path::Path::new(&path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ParleyError::Storage {
                source: Box::new(e),
            })?;
        }
        let db = Database::open_with(&path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ParleyError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ParleyError> {
        self.database()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Identity operations ---

    async fn ensure_registered(&self, profile: &UserProfile) -> Result<bool, ParleyError> {
        queries::identities::ensure_registered(self.database()?, profile).await
    }

    async fn get_identity(&self, id: i64) -> Result<Option<Identity>, ParleyError> {
        queries::identities::get_identity(self.database()?, id).await
    }

    async fn is_banned(&self, id: i64) -> Result<bool, ParleyError> {
        queries::identities::is_banned(self.database()?, id).await
    }

    async fn set_ban(&self, id: i64, banned: bool) -> Result<bool, ParleyError> {
        queries::identities::set_ban(self.database()?, id, banned).await
    }

    async fn list_identity_ids(&self) -> Result<Vec<i64>, ParleyError> {
        queries::identities::list_identity_ids(self.database()?).await
    }

    // --- Thread link operations ---

    async fn record_link(
        &self,
        source: MessageRef,
        destination: MessageRef,
        kind: LinkKind,
    ) -> Result<bool, ParleyError> {
        queries::links::record_link(self.database()?, source, destination, kind).await
    }

    async fn resolve_forward(
        &self,
        destination: MessageRef,
    ) -> Result<Option<MessageRef>, ParleyError> {
        queries::links::resolve_forward(self.database()?, destination).await
    }

    async fn resolve_reverse(&self, source: MessageRef) -> Result<Option<MessageRef>, ParleyError> {
        queries::links::resolve_reverse(self.database()?, source).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{ChatId, MessageId};
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("data").join("parley.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn operations_before_initialize_fail() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("uninit.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert!(storage.list_identity_ids().await.is_err());
        assert!(storage.shutdown().await.is_ok());
    }

    #[tokio::test]
    async fn double_initialize_is_rejected() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn data_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("persist.db");
        let path = db_path.to_str().unwrap();
        let source = MessageRef::new(ChatId(111), MessageId(5));
        let destination = MessageRef::new(ChatId(-100), MessageId(42));

        {
            let storage = SqliteStorage::new(make_config(path));
            storage.initialize().await.unwrap();
            storage
                .ensure_registered(&UserProfile {
                    id: 111,
                    first_name: Some("Ann".into()),
                    last_name: None,
                    username: None,
                })
                .await
                .unwrap();
            storage.set_ban(111, true).await.unwrap();
            storage
                .record_link(source, destination, LinkKind::Request)
                .await
                .unwrap();
            storage.close().await.unwrap();
        }

        let storage = SqliteStorage::new(make_config(path));
        storage.initialize().await.unwrap();
        assert!(storage.is_banned(111).await.unwrap());
        assert_eq!(storage.resolve_forward(destination).await.unwrap(), Some(source));
        assert_eq!(storage.list_identity_ids().await.unwrap(), vec![111]);
    }
}
