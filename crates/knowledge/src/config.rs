//! Collection configuration and on-disk layout.

use crate::types::CollectionConfig;
use crag_core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Load collection configuration.
///
/// Loads from `.crag/index/<collection>/config.yaml` if it exists,
/// otherwise returns the default config named after the collection.
pub fn load_config(workspace: &Path, collection: &str) -> AppResult<CollectionConfig> {
    let config_path = get_config_path(workspace, collection);

    if !config_path.exists() {
        tracing::debug!(
            "Using default config for collection '{}' (no config file found)",
            collection
        );
        return Ok(CollectionConfig {
            name: collection.to_string(),
            ..Default::default()
        });
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        AppError::Knowledge(format!("Failed to read config at {:?}: {}", config_path, e))
    })?;

    let mut config: CollectionConfig = serde_yaml::from_str(&content).map_err(|e| {
        AppError::Knowledge(format!("Failed to parse config at {:?}: {}", config_path, e))
    })?;
    config.name = collection.to_string();

    tracing::debug!("Loaded config for collection '{}'", collection);
    Ok(config)
}

/// Save collection configuration.
pub fn save_config(workspace: &Path, config: &CollectionConfig) -> AppResult<()> {
    let config_path = get_config_path(workspace, &config.name);

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::Knowledge(format!("Failed to create collection directory: {}", e))
        })?;
    }

    let yaml = serde_yaml::to_string(config)
        .map_err(|e| AppError::Knowledge(format!("Failed to serialize config: {}", e)))?;

    fs::write(&config_path, yaml).map_err(|e| {
        AppError::Knowledge(format!("Failed to write config to {:?}: {}", config_path, e))
    })?;

    tracing::debug!("Saved config for collection '{}'", config.name);
    Ok(())
}

/// Directory holding a collection.
pub fn get_collection_dir(workspace: &Path, collection: &str) -> PathBuf {
    workspace.join(".crag").join("index").join(collection)
}

/// Path to a collection's config file.
pub fn get_config_path(workspace: &Path, collection: &str) -> PathBuf {
    get_collection_dir(workspace, collection).join("config.yaml")
}

/// Path to a collection's SQLite index.
pub fn get_index_path(workspace: &Path, collection: &str) -> PathBuf {
    get_collection_dir(workspace, collection).join("index.sqlite")
}
