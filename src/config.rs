use crate::error::{RecmanError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Board file name inside the project's `.recman` directory
    pub board_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            board_file: "board.json".to_string(),
        }
    }
}

/// Settings used when a new board is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    /// Column titles of a freshly initialized board
    pub default_columns: Vec<String>,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            default_columns: vec![
                "To Do".to_string(),
                "In Progress".to_string(),
                "Done".to_string(),
            ],
        }
    }
}

/// Project configuration, read from `.recman/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub board: BoardSettings,
}

impl Config {
    pub const FILE_NAME: &'static str = "config.toml";

    /// Loads the configuration, falling back to defaults when the file does not exist
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).await?;
        Self::from_toml_str(&contents)?.validated()
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RecmanError::ConfigError(e.to_string()))
    }

    /// Checks the settings and trims the board file name
    fn validated(mut self) -> Result<Self> {
        let file = self.storage.board_file.trim();
        if file.is_empty() || file == "." || file == ".." || file.contains(['/', '\\']) {
            return Err(RecmanError::ConfigError(format!(
                "storage.board_file must be a plain file name, got '{}'",
                self.storage.board_file
            )));
        }
        self.storage.board_file = file.to_string();

        if self
            .board
            .default_columns
            .iter()
            .any(|title| title.trim().is_empty())
        {
            return Err(RecmanError::ConfigError(
                "board.default_columns must not contain blank titles".to_string(),
            ));
        }

        Ok(self)
    }
}
