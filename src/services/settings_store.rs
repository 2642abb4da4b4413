use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings must be a JSON object")]
    NotAnObject,
}

/// Settings document written on first read
pub fn default_settings() -> Value {
    json!({
        "spreadsheet": {
            "spreadsheet_id": "",
            "auto_import": false,
            "import_frequency": "daily"
        },
        "excel": {
            "auto_import": false,
            "import_frequency": "daily",
            "last_import_directory": ""
        },
        "notifications": {
            "email_notifications": false,
            "app_notifications": true,
            "email_address": ""
        },
        "ui": {
            "theme": "light",
            "items_per_page": 10,
            "default_sort": "created_at"
        },
        "backup": {
            "auto_backup": false,
            "backup_frequency": "weekly",
            "backup_directory": ""
        }
    })
}

/// JSON settings document on local disk
///
/// Reads and writes are serialized through one lock, so a PUT never
/// interleaves with the first-read default write.
pub struct SettingsStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings, creating the default document if none exists
    pub async fn load(&self) -> Result<Value, SettingsError> {
        let _guard = self.lock.lock().await;

        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let defaults = default_settings();
                self.write(&defaults).await?;
                tracing::info!("Created default settings at {}", self.path.display());
                Ok(defaults)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the stored document
    pub async fn save(&self, settings: &Value) -> Result<(), SettingsError> {
        if !settings.is_object() {
            return Err(SettingsError::NotAnObject);
        }
        let _guard = self.lock.lock().await;
        self.write(settings).await
    }

    async fn write(&self, settings: &Value) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(settings)?;
        tokio::fs::write(&self.path, body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("nested").join("settings.json"));

        let settings = store.load().await.unwrap();
        assert_eq!(settings, default_settings());
        assert!(store.path().exists());
        assert_eq!(settings["ui"]["items_per_page"], 10);
    }

    #[tokio::test]
    async fn test_save_replaces_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));

        let updated = json!({"ui": {"theme": "dark"}});
        store.save(&updated).await.unwrap();
        assert_eq!(store.load().await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_save_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));

        assert!(matches!(
            store.save(&json!([1, 2])).await,
            Err(SettingsError::NotAnObject)
        ));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{broken").unwrap();

        let store = SettingsStore::new(path);
        assert!(matches!(store.load().await, Err(SettingsError::Json(_))));
    }
}
