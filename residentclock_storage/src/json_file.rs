use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::*;

use crate::model::ServerConfig;
use crate::store::ConfigStore;

/// Layout of the settings file.
#[derive(Debug, Default, Deserialize, Serialize)]
struct SettingsDocument {
    #[serde(default)]
    per_server: Vec<ServerConfig>,
}

/// Stores all server settings in a single json file.
///
/// ## Creation
/// Create a new store by calling `JsonFileStore::new` with the path of the file. The file and its
/// parent directory are created on the first save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

}

/// Contents of `path`, or `None` when the file does not exist or is blank.
pub(crate) async fn read_if_present(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Error reading {}", path.display())),
    }
}

/// Replace `path` with `contents`, creating the parent directory when needed.
///
/// The contents are written next to the target first and then renamed over it, so readers never see
/// a half written file.
pub(crate) async fn write_replacing(path: &Path, contents: String) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Error creating directory {}", parent.display()))?;
    }

    let temp_path = temp_path(path);
    tokio::fs::write(&temp_path, contents)
        .await
        .with_context(|| format!("Error writing {}", temp_path.display()))?;
    tokio::fs::rename(&temp_path, path)
        .await
        .with_context(|| format!("Error replacing {}", path.display()))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");

    path.with_file_name(name)
}

#[async_trait]
impl ConfigStore for JsonFileStore {
    #[instrument(level = "trace", name = "storage.json_file.load", skip_all, fields(servers = field::Empty))]
    async fn load_all(&self) -> Result<Vec<ServerConfig>> {
        event!(Level::TRACE, path = %self.path.display(), "Reading settings file");

        let Some(raw) = read_if_present(&self.path).await? else {
            event!(Level::DEBUG, "Settings file does not exist yet, starting empty");
            return Ok(Vec::new());
        };

        let document: SettingsDocument = serde_json::from_str(&raw)
            .with_context(|| format!("Error parsing settings file {}", self.path.display()))?;

        Span::current().record("servers", document.per_server.len());
        event!(Level::TRACE, "Loaded settings");

        Ok(document.per_server)
    }

    #[instrument(level = "trace", name = "storage.json_file.save", skip_all, fields(servers = configs.len()))]
    async fn save_all(&self, configs: &[ServerConfig]) -> Result<()> {
        event!(Level::TRACE, path = %self.path.display(), "Writing settings file");

        let document = SettingsDocument { per_server: configs.to_vec() };
        let json = serde_json::to_string_pretty(&document).with_context(|| "Error serializing settings")?;
        write_replacing(&self.path, json).await?;

        event!(Level::TRACE, "Saved settings");

        Ok(())
    }
}
