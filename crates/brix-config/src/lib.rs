//! Persistent configuration for the brix build tool
//!
//! The configuration is a small TOML file holding the location of the
//! package installer used to download third-party plugins and the host
//! namespace used to derive builtin plugin module names.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use which::which;

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "BRIX_CONFIG";

/// Pointer file next to the default config naming the real config file
pub const CONFIG_POINTER_FILE: &str = ".brix_config_path";

/// Namespace used for builtin plugin modules when none is configured
pub const DEFAULT_PLUGIN_NAMESPACE: &str = "brix";

/// Installer invoked when none is configured or found on `PATH`
pub const DEFAULT_INSTALLER: &str = "pip";

/// Installer executables looked up on `PATH`, in order
const INSTALLER_CANDIDATES: &[&str] = &["pip3", "pip"];

/// Keys accepted by [`Config::get`] and [`Config::set`]
pub const CONFIG_KEYS: &[&str] = &["installer-path", "plugin-namespace"];

/// Error type for configuration handling
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown config key: {0}. Currently supported keys: {keys}", keys = CONFIG_KEYS.join(", "))]
    UnknownKey(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installer_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_namespace: Option<String>,
}

impl Config {
    /// Resolve the config file path
    ///
    /// `$BRIX_CONFIG` wins when set and non-empty, then the pointer file next
    /// to the default config, then the default `brix.toml`.
    pub fn path() -> PathBuf {
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        let default = default_config_dir().join("brix.toml");

        let pointer = default_config_dir().join(CONFIG_POINTER_FILE);
        if pointer.exists() {
            if let Ok(contents) = fs::read_to_string(&pointer) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
        }

        default
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path())
    }

    /// Load the config stored at `path`, or defaults when the file is absent
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "installer-path" => self.installer_path.clone(),
            "plugin-namespace" => self.plugin_namespace.clone(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "installer-path" => self.installer_path = Some(value),
            "plugin-namespace" => self.plugin_namespace = Some(value),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.installer_path.is_none() && self.plugin_namespace.is_none()
    }

    pub fn values_iter(&self) -> Vec<(&str, String)> {
        let mut values = Vec::new();
        if let Some(ref val) = self.installer_path {
            values.push(("installer-path", val.clone()));
        }
        if let Some(ref val) = self.plugin_namespace {
            values.push(("plugin-namespace", val.clone()));
        }
        values
    }

    /// Installer executable, falling back to a bare `pip`
    pub fn get_installer_path(&self) -> String {
        self.installer_path
            .clone()
            .unwrap_or_else(|| DEFAULT_INSTALLER.to_string())
    }

    /// Host namespace for builtin plugin modules
    pub fn get_plugin_namespace(&self) -> String {
        self.plugin_namespace
            .clone()
            .unwrap_or_else(|| DEFAULT_PLUGIN_NAMESPACE.to_string())
    }

    /// Locate an installer on `PATH` when none is configured and persist it
    pub fn ensure_installer_path(&mut self) -> Result<(), ConfigError> {
        if self.installer_path.is_some() {
            return Ok(());
        }

        if let Some(found) = find_installer() {
            self.installer_path = Some(found.to_string_lossy().to_string());
            self.save()?;
        }

        Ok(())
    }
}

fn find_installer() -> Option<PathBuf> {
    INSTALLER_CANDIDATES
        .iter()
        .find_map(|candidate| which(candidate).ok())
}

/// Platform-appropriate brix config directory
pub fn default_config_dir() -> PathBuf {
    #[cfg(not(target_os = "windows"))]
    let base = dirs::home_dir().map(|home| home.join(".config"));

    #[cfg(target_os = "windows")]
    let base = dirs::config_dir();

    base.unwrap_or_else(|| PathBuf::from(".")).join("brix")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::default();
        assert!(config.is_empty());
        assert_eq!(config.get_installer_path(), "pip");
        assert_eq!(config.get_plugin_namespace(), "brix");
    }

    #[test]
    fn test_set_and_get_known_keys() {
        let mut config = Config::default();
        assert!(config.set("installer-path", "/usr/bin/pip3".to_string()).is_ok());
        assert!(config.set("plugin-namespace", "acme".to_string()).is_ok());
        assert_eq!(config.get("installer-path").as_deref(), Some("/usr/bin/pip3"));
        assert_eq!(config.get_plugin_namespace(), "acme");
        assert_eq!(config.values_iter().len(), 2);
    }

    #[test]
    fn test_set_unknown_key_is_rejected() {
        let mut config = Config::default();
        let result = config.set("colour", "blue".to_string());
        assert!(matches!(result, Err(ConfigError::UnknownKey(ref key)) if key == "colour"));
        assert!(config.is_empty());
    }

    #[test]
    fn test_error_messages() {
        let unknown = ConfigError::UnknownKey("colour".to_string());
        assert_eq!(
            unknown.to_string(),
            "Unknown config key: colour. Currently supported keys: installer-path, plugin-namespace"
        );

        let io = ConfigError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(matches!(io, ConfigError::Io(_)));
        assert_eq!(io.to_string(), "IO error: denied");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {}", e));
        let path = dir.path().join("nested").join("brix.toml");

        let mut config = Config::default();
        assert!(config.set("plugin-namespace", "acme".to_string()).is_ok());
        assert!(config.save_to(&path).is_ok());

        let loaded = Config::load_from(&path);
        assert!(loaded.is_ok_and(|c| c == config));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {}", e));
        let loaded = Config::load_from(&dir.path().join("absent.toml"));
        assert!(loaded.is_ok_and(|c| c.is_empty()));
    }

    #[test]
    fn test_load_invalid_toml_is_parse_error() {
        let dir = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {}", e));
        let path = dir.path().join("brix.toml");
        assert!(fs::write(&path, "installer_path = [").is_ok());
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }
}
