use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::{event, Level};

use crate::model::{reconcile, Reconciliation, ServerConfig};

/// Whole-document access to the per-server settings.
///
/// Every write replaces the full collection. There is no locking between writers, so two
/// concurrent read-modify-write cycles can lose one of the updates.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the settings of every server, in stored order.
    async fn load_all(&self) -> Result<Vec<ServerConfig>>;

    /// Replace all stored settings.
    async fn save_all(&self, configs: &[ServerConfig]) -> Result<()>;

    /// Get the settings of a single server.
    async fn get(&self, server_id: u64) -> Result<Option<ServerConfig>> {
        let configs = self.load_all().await?;

        Ok(configs.into_iter().find(|c| c.server_id == server_id))
    }

    /// Replace the settings of `config.server_id`, or append them when the server is new.
    async fn upsert(&self, config: ServerConfig) -> Result<()> {
        let mut configs = self.load_all().await?;

        match configs.iter_mut().find(|c| c.server_id == config.server_id) {
            Some(existing) => *existing = config,
            None => configs.push(config),
        }

        self.save_all(&configs).await
    }

    /// Make sure every given server has settings and write the normalised document back.
    ///
    /// Writing back also fills in fields that were missing from the stored records.
    async fn reconcile(&self, server_ids: &[u64]) -> Result<Reconciliation> {
        let mut configs = self.load_all().await?;
        let report = reconcile(&mut configs, server_ids.iter().copied());

        event!(
            Level::DEBUG,
            "Reconciled {} servers, added {}",
            configs.len(),
            report.added.len()
        );

        self.save_all(&configs).await?;

        Ok(report)
    }
}

/// Keeps all settings in memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    configs: Mutex<Vec<ServerConfig>>,
}

impl MemoryStore {
    pub fn new(configs: Vec<ServerConfig>) -> Self {
        Self { configs: Mutex::new(configs) }
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn load_all(&self) -> Result<Vec<ServerConfig>> {
        let configs = self.configs.lock().map_err(|_| anyhow!("Memory store lock is poisoned"))?;

        Ok(configs.clone())
    }

    async fn save_all(&self, configs: &[ServerConfig]) -> Result<()> {
        let mut stored = self.configs.lock().map_err(|_| anyhow!("Memory store lock is poisoned"))?;
        *stored = configs.to_vec();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_finds_server() -> Result<()> {
        let mut config = ServerConfig::new(2);
        config.default_city = "Lisbon".into();
        let store = MemoryStore::new(vec![ServerConfig::new(1), config.clone()]);

        assert_eq!(store.get(2).await?, Some(config));
        assert_eq!(store.get(3).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn upsert_replaces_in_place_and_appends() -> Result<()> {
        let store = MemoryStore::new(vec![ServerConfig::new(1), ServerConfig::new(2)]);

        let mut changed = ServerConfig::new(1);
        changed.timezone_offset = -8;
        store.upsert(changed.clone()).await?;
        store.upsert(ServerConfig::new(3)).await?;

        assert_eq!(
            store.load_all().await?,
            vec![changed, ServerConfig::new(2), ServerConfig::new(3)]
        );

        Ok(())
    }

    #[tokio::test]
    async fn reconcile_twice_changes_nothing_the_second_time() -> Result<()> {
        let store = MemoryStore::default();

        let first = store.reconcile(&[10, 20]).await?;
        let second = store.reconcile(&[10, 20]).await?;

        assert_eq!(first.added, vec![10, 20]);
        assert!(second.is_unchanged());
        assert_eq!(store.load_all().await?.len(), 2);

        Ok(())
    }
}
