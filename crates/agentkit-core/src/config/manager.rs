//! File-backed configuration manager (YAML or JSON)
//!
//! Looks for `config.yaml`, `config.yml` or `config.json` in the
//! configuration directory and then in the working directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use super::app::AppConfig;
use super::error::{ConfigError, ConfigResult};
use crate::logging::Logger;

const CANDIDATE_NAMES: [&str; 3] = ["config.yaml", "config.yml", "config.json"];

/// Serialization format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Loads, caches, updates and saves [`AppConfig`]
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use agentkit_core::config::ConfigManager;
/// use agentkit_core::logging::NoOpLogger;
///
/// let manager = ConfigManager::new("config", Arc::new(NoOpLogger));
/// let config = manager.load_config(None).unwrap();
/// println!("provider: {}", config.model.provider);
/// ```
pub struct ConfigManager {
    config_dir: PathBuf,
    cache: RwLock<Option<AppConfig>>,
    logger: Arc<dyn Logger>,
}

impl ConfigManager {
    pub fn new(config_dir: impl Into<PathBuf>, logger: Arc<dyn Logger>) -> Self {
        Self {
            config_dir: config_dir.into(),
            cache: RwLock::new(None),
            logger,
        }
    }

    /// Manager rooted at the user config directory (~/.config/agentkit on Linux)
    pub fn user(logger: Arc<dyn Logger>) -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("agentkit"), logger)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Candidate files in search order
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        CANDIDATE_NAMES
            .iter()
            .map(|name| self.config_dir.join(name))
            .chain(CANDIDATE_NAMES.iter().map(PathBuf::from))
            .collect()
    }

    /// Load configuration from `path`, or from the first candidate that exists
    ///
    /// Without an explicit path and without any candidate file the default
    /// configuration is returned. An explicit path must exist.
    pub fn load_config(&self, path: Option<&Path>) -> ConfigResult<AppConfig> {
        let file = match path {
            Some(p) => p.to_path_buf(),
            None => match self.candidate_paths().into_iter().find(|p| p.exists()) {
                Some(found) => found,
                None => {
                    self.logger
                        .warn("[ConfigManager] No configuration file found, using defaults");
                    let config = AppConfig::default();
                    *self.cache.write() = Some(config.clone());
                    return Ok(config);
                }
            },
        };

        if !file.exists() {
            return Err(ConfigError::NotFound(file));
        }

        let content = fs::read_to_string(&file)?;
        let config = match Self::parse(&content, ConfigFormat::from_path(&file)) {
            Ok(config) => config,
            Err(e) => {
                self.logger.error(&format!(
                    "[ConfigManager] Failed to load {}: {}",
                    file.display(),
                    e
                ));
                return Err(e);
            }
        };

        self.logger.info(&format!(
            "[ConfigManager] Loaded configuration from {}",
            file.display()
        ));
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }

    /// Parse configuration text in the given format
    pub fn parse(content: &str, format: ConfigFormat) -> ConfigResult<AppConfig> {
        let config = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }

    /// Write `config` to `path`, creating parent directories as needed
    pub fn save_config(&self, config: &AppConfig, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = match ConfigFormat::from_path(path) {
            ConfigFormat::Yaml => serde_yaml::to_string(config)?,
            ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        };
        fs::write(path, content)?;

        self.logger.info(&format!(
            "[ConfigManager] Saved configuration to {}",
            path.display()
        ));
        Ok(())
    }

    /// The most recently loaded or updated configuration
    pub fn get_config(&self) -> Option<AppConfig> {
        self.cache.read().clone()
    }

    /// Merge top-level keys into the current configuration
    ///
    /// Starts from the default configuration when nothing is loaded yet.
    /// Unknown keys are ignored.
    pub fn update_config(&self, updates: &Map<String, Value>) -> ConfigResult<AppConfig> {
        let current = self.get_config().unwrap_or_default();
        let mut merged = match serde_json::to_value(&current)? {
            Value::Object(map) => map,
            _ => return Err(ConfigError::Invalid("configuration is not an object".to_string())),
        };

        for (key, value) in updates {
            if AppConfig::KEYS.contains(&key.as_str()) {
                merged.insert(key.clone(), value.clone());
            } else {
                self.logger.warn(&format!(
                    "[ConfigManager] Ignoring unknown configuration key: {}",
                    key
                ));
            }
        }

        let updated: AppConfig = serde_json::from_value(Value::Object(merged))
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        *self.cache.write() = Some(updated.clone());
        Ok(updated)
    }
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("config_dir", &self.config_dir)
            .field("loaded", &self.cache.read().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelSettings;
    use crate::logging::{LogLevel, MemoryLogger, NoOpLogger};
    use serde_json::json;
    use tempfile::tempdir;

    fn manager(dir: &Path) -> ConfigManager {
        ConfigManager::new(dir, Arc::new(NoOpLogger))
    }

    #[test]
    fn test_load_yaml_from_config_dir() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "model:\n  provider: openai\n  model: gpt-4o-mini\ndebug: true\n",
        )
        .unwrap();

        let manager = manager(dir.path());
        let config = manager.load_config(None).unwrap();
        assert_eq!(config.model.provider, "openai");
        assert!(config.debug);
        assert_eq!(manager.get_config(), Some(config));
    }

    #[test]
    fn test_yaml_takes_precedence_over_json() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("config.json"), r#"{"debug": false}"#).unwrap();
        fs::write(dir.path().join("config.yml"), "debug: true\n").unwrap();

        let config = manager(dir.path()).load_config(None).unwrap();
        assert!(config.debug);
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = manager(dir.path()).load_config(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(p) if p == missing));
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let logger = Arc::new(MemoryLogger::new());
        let manager = ConfigManager::new(dir.path(), logger.clone());
        assert!(matches!(
            manager.load_config(Some(&path)),
            Err(ConfigError::Json(_))
        ));
        assert!(logger.contains(LogLevel::Error, "broken.json"));
    }

    #[test]
    fn test_save_and_reload_both_formats() {
        let dir = tempdir().unwrap();
        let manager = manager(dir.path());
        let mut config = AppConfig::default();
        config.model = ModelSettings::new("anthropic", "claude-3-5-haiku").with_temperature(0.2);

        for name in ["nested/out.yaml", "nested/out.json"] {
            let path = dir.path().join(name);
            manager.save_config(&config, &path).unwrap();
            let loaded = manager.load_config(Some(&path)).unwrap();
            assert_eq!(loaded, config);
        }
    }

    #[test]
    fn test_update_config_merges_known_keys() {
        let dir = tempdir().unwrap();
        let logger = Arc::new(MemoryLogger::new());
        let manager = ConfigManager::new(dir.path(), logger.clone());

        let updates = json!({
            "debug": true,
            "max_execution_time": 60,
            "colour": "blue"
        });
        let updated = manager
            .update_config(updates.as_object().unwrap())
            .unwrap();

        assert!(updated.debug);
        assert_eq!(updated.max_execution_time, 60);
        assert_eq!(updated.model.model, "qwen3:0.6b");
        assert!(logger.contains(LogLevel::Warn, "colour"));
    }

    #[test]
    fn test_update_config_rejects_wrong_shape() {
        let dir = tempdir().unwrap();
        let updates = json!({"debug": "very"});
        let result = manager(dir.path()).update_config(updates.as_object().unwrap());
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
