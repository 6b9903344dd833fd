use crate::utils::{expand_tilde, get_data_path};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleConfig {
    /// Override for the task store file; defaults to `~/.herald/schedule.json`.
    pub store_path: Option<String>,
}

impl ScheduleConfig {
    pub fn resolved_store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(expand_tilde(path)),
            None => Ok(get_data_path()?.join("schedule.json")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct StatusConfig {
    /// Buffered status updates before new ones are dropped.
    pub event_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub schedule: ScheduleConfig,
    pub status: StatusConfig,
}

impl Config {
    pub fn event_capacity(&self) -> usize {
        if self.status.event_capacity == 0 {
            64
        } else {
            self.status.event_capacity
        }
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_data_path()?.join("config.json"))
}

pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => get_config_path()?,
    };

    if !path.exists() {
        return Ok(Config::default());
    }

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;
    Ok(config)
}

pub fn save_config(config: &Config, config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => get_config_path()?,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("herald-config-{}.json", uuid::Uuid::new_v4()));
        let config = load_config(Some(&path)).expect("load");
        assert!(config.schedule.store_path.is_none());
        assert_eq!(config.event_capacity(), 64);
    }

    #[test]
    fn config_round_trips() {
        let path = std::env::temp_dir().join(format!("herald-config-{}.json", uuid::Uuid::new_v4()));
        let mut config = Config::default();
        config.schedule.store_path = Some("/tmp/herald-tasks.json".to_string());
        save_config(&config, Some(&path)).expect("save");
        let loaded = load_config(Some(&path)).expect("load");
        assert_eq!(
            loaded.schedule.store_path.as_deref(),
            Some("/tmp/herald-tasks.json")
        );
        let _ = std::fs::remove_file(path);
    }
}
