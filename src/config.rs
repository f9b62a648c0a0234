use crate::error::{MapperError, Result};
use indas_mapper_common::MatchPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the model provider API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
    pub timeout_seconds: u64,
    /// SQLite file holding confirmed and rejected mappings
    pub database: PathBuf,
    /// Sheet read from workbook inputs
    pub sheet_name: String,
    pub label_match: MatchPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4".into(),
            temperature: 0.2,
            base_url: "https://api.openai.com/v1".into(),
            timeout_seconds: 120,
            database: PathBuf::from("account_mappings.db"),
            sheet_name: "TrialBalance".into(),
            label_match: MatchPolicy::Containment,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| MapperError::Config(format!("{}: {}", config_path.display(), e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| MapperError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("indas-mapper").join("config.json"))
    }

    /// API key from the environment, then the config file
    pub fn get_api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(MapperError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }
}
