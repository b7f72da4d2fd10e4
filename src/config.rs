use crate::error::{ChangeflowError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the staging directory holding pending change records and the
/// configuration file, relative to the project root.
pub const STAGING_DIR: &str = ".changeflow";

/// Name of the configuration file inside the staging directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Represents the complete configuration for changeflow.
///
/// Holds the current project version, the changelog location, the list of
/// files carrying an embedded version string, and release-time behavior.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Current released version of the project (canonical X.Y.Z)
    pub version: String,

    #[serde(default = "default_changelog_path")]
    pub changelog: String,

    #[serde(default)]
    pub version_files: Vec<VersionFileConfig>,

    #[serde(default)]
    pub on_apply: OnApplyConfig,
}

/// One file carrying an embedded version string.
///
/// `pattern` is a regular expression with exactly one capture group
/// denoting the version substring to replace.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VersionFileConfig {
    pub path: String,
    pub pattern: String,
}

/// Release-time behavior configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OnApplyConfig {
    #[serde(default = "default_true")]
    pub commit_files: bool,

    #[serde(default = "default_true")]
    pub tag_commit: bool,

    #[serde(default = "default_tag_format")]
    pub tag_format: String,

    #[serde(default)]
    pub commands: Vec<String>,
}

fn default_changelog_path() -> String {
    "CHANGELOG.md".to_string()
}

fn default_tag_format() -> String {
    "v{version}".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for OnApplyConfig {
    fn default() -> Self {
        OnApplyConfig {
            commit_files: true,
            tag_commit: true,
            tag_format: default_tag_format(),
            commands: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version: "0.0.0".to_string(),
            changelog: default_changelog_path(),
            version_files: Vec::new(),
            on_apply: OnApplyConfig::default(),
        }
    }
}

/// Returns the staging directory path for a project root.
pub fn staging_dir(root: &Path) -> PathBuf {
    root.join(STAGING_DIR)
}

impl Config {
    /// Load configuration from `.changeflow/config.toml` under the root.
    ///
    /// # Returns
    /// * `Ok(Config)` - Parsed configuration
    /// * `Err` - If the staging directory or config file is missing, or the
    ///   file cannot be parsed
    pub fn load(root: &Path) -> Result<Self> {
        let dir = staging_dir(root);
        if !dir.is_dir() {
            return Err(ChangeflowError::config(format!(
                "{} directory not found in {}. Run `changeflow --init` first",
                STAGING_DIR,
                root.display()
            )));
        }

        let path = dir.join(CONFIG_FILE);
        if !path.is_file() {
            return Err(ChangeflowError::config(format!(
                "Configuration file not found: {}. Run `changeflow --init` first",
                path.display()
            )));
        }

        let contents = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&contents).map_err(|e| {
            ChangeflowError::config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// Persist configuration by full overwrite of `.changeflow/config.toml`.
    pub fn save(&self, root: &Path) -> Result<()> {
        let dir = staging_dir(root);
        if !dir.is_dir() {
            return Err(ChangeflowError::config(format!(
                "{} directory not found in {}. Run `changeflow --init` first",
                STAGING_DIR,
                root.display()
            )));
        }

        let contents = toml::to_string_pretty(self).map_err(|e| {
            ChangeflowError::config(format!("Failed to serialize configuration: {}", e))
        })?;
        fs::write(dir.join(CONFIG_FILE), contents)?;
        Ok(())
    }

    /// Scaffold the staging directory with a default configuration.
    ///
    /// Fails if a configuration file already exists so an existing setup is
    /// never clobbered.
    pub fn init(root: &Path, version: &str) -> Result<Self> {
        let dir = staging_dir(root);
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            return Err(ChangeflowError::config(format!(
                "Configuration file already exists: {}",
                path.display()
            )));
        }

        fs::create_dir_all(&dir)?;
        let config = Config {
            version: version.to_string(),
            ..Config::default()
        };
        config.save(root)?;
        Ok(config)
    }
}
