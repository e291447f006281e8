use crate::models::DemoConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Name of the settings file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "FetchDemo.yaml";

/// Prefix of environment variables that override file settings,
/// e.g. `FETCHDEMO__TASK__STEPS=5`.
pub const ENV_PREFIX: &str = "FETCHDEMO";

/// Configuration manager for loading and saving `FetchDemo.yaml`.
///
/// Settings are layered, later sources winning:
/// 1. Built-in defaults ([`DemoConfig::default`])
/// 2. The YAML file in the configuration directory
/// 3. `FETCHDEMO__<SECTION>__<KEY>` environment variables
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
    env_prefix: String,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing the configuration file (e.g., "FetchDemo Data")
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        Self::with_env_prefix(config_dir, ENV_PREFIX)
    }

    /// Create a ConfigManager reading overrides from a custom environment prefix.
    pub fn with_env_prefix<P: AsRef<Utf8Path>>(config_dir: P, env_prefix: &str) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        // Create config directory if it doesn't exist
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
            env_prefix: env_prefix.to_string(),
        })
    }

    /// Load and validate the configuration.
    ///
    /// A missing file is created from the defaults first, so users have
    /// something to edit.
    pub fn load(&self) -> Result<DemoConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, writing defaults",
                self.config_path
            );
            self.save(&DemoConfig::default())?;
        }

        let settings = ::config::Config::builder()
            .add_source(
                ::config::File::new(self.config_path.as_str(), ::config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                ::config::Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let config: DemoConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        config
            .validate()
            .with_context(|| format!("Invalid config: {}", self.config_path))?;

        tracing::info!("Loaded config from {}", self.config_path);
        Ok(config)
    }

    /// Save the configuration file.
    pub fn save(&self, config: &DemoConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the configuration file path.
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager =
            ConfigManager::with_env_prefix(&config_path, "FETCHDEMO_UNIT_UNUSED").unwrap();
        (manager, temp_dir)
    }

    #[test]
    fn test_missing_file_written_with_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();
        assert!(!manager.config_path().exists());

        let config = manager.load().unwrap();

        assert!(manager.config_path().exists());
        assert_eq!(config, DemoConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let (manager, _temp_dir) = create_test_config_manager();

        let mut config = DemoConfig::default();
        config.task.steps = 10;
        config.task.result = "Ada Lovelace".to_string();
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.task.steps, 10);
        assert_eq!(loaded.task.result, "Ada Lovelace");
    }

    #[test]
    fn test_invalid_file_rejected() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(manager.config_path(), "task:\n  steps: 0\n").unwrap();

        let err = manager.load().unwrap_err();
        assert!(format!("{:#}", err).contains("task.steps must be between 1 and 100"));
    }
}
