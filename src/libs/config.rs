//! Application configuration.
//!
//! Stored as `config.json` in the platform data directory. A missing file
//! means defaults: a local SQLite database and shared-table addressing.
//! `NOUNOU_API_URL` and `NOUNOU_API_KEY` (from the environment or a `.env`
//! file) switch the store to the hosted backend without touching the file.
//!
//! ```json
//! {
//!   "store": { "backend": "rest", "api_url": "https://project.supabase.co", "api_key": "..." },
//!   "addressing": "per_child",
//!   "default_child": "caly"
//! }
//! ```

use super::data_storage::DataStorage;
use crate::api::rest::{RestConfig, RestStore};
use crate::db::db::DB_FILE_NAME;
use crate::db::store::SqliteStore;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_print};
use crate::store::{Addressing, Backend};
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const ENV_API_URL: &str = "NOUNOU_API_URL";
pub const ENV_API_KEY: &str = "NOUNOU_API_KEY";

/// Identifies a configurable section in the setup wizard.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Local database; the data directory is used when `path` is absent.
    Sqlite {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    Rest(RestConfig),
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Sqlite { path: None }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub addressing: Addressing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_child: Option<String>,
    /// Account used to pick the dashboard view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Config {
    /// Reads the configuration from the data directory, with environment overrides.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        let mut config = Self::read_from(&config_file_path)?;
        msg_debug!(Message::ConfigRead(config_file_path.display().to_string()));
        config.apply_overrides(env::var(ENV_API_URL).ok(), env::var(ENV_API_KEY).ok());
        Ok(config)
    }

    pub fn read_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let config_str = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&config_str)?)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        self.save_to(&config_file_path)?;
        Ok(config_file_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Switches to the hosted backend when both URL and key are given.
    pub fn apply_overrides(&mut self, api_url: Option<String>, api_key: Option<String>) {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        if let (Some(api_url), Some(api_key)) = (non_blank(api_url), non_blank(api_key)) {
            tracing::debug!(%api_url, "using hosted backend from environment");
            self.store = StoreConfig::Rest(RestConfig { api_url, api_key });
        }
    }

    /// Copy safe to print: the API key keeps only its last four characters.
    pub fn masked(&self) -> Config {
        let mut config = self.clone();
        if let StoreConfig::Rest(rest) = &mut config.store {
            let chars: Vec<char> = rest.api_key.chars().collect();
            rest.api_key = if chars.len() > 8 {
                format!("****{}", chars[chars.len() - 4..].iter().collect::<String>())
            } else {
                "****".to_string()
            };
        }
        config
    }

    pub fn open_backend(&self) -> Result<Backend> {
        match &self.store {
            StoreConfig::Sqlite { path } => {
                let path = match path {
                    Some(path) => path.clone(),
                    None => DataStorage::new().get_path(DB_FILE_NAME)?,
                };
                tracing::debug!(path = %path.display(), "opening local database");
                Ok(Backend::Sqlite(SqliteStore::open(&path)?))
            }
            StoreConfig::Rest(rest) => Ok(Backend::Rest(RestStore::new(rest))),
        }
    }

    /// Interactive setup, starting from the saved values.
    pub fn init() -> Result<Self> {
        let mut config = Self::read_from(&DataStorage::new().get_path(CONFIG_FILE_NAME)?).unwrap_or_default();
        let theme = ColorfulTheme::default();

        let backends = [
            ConfigModule {
                key: "sqlite".to_string(),
                name: "Local database".to_string(),
            },
            RestConfig::module(),
        ];
        let current = match config.store {
            StoreConfig::Sqlite { .. } => 0,
            StoreConfig::Rest(_) => 1,
        };
        let selection = Select::with_theme(&theme)
            .with_prompt(Message::PromptSelectBackend.to_string())
            .items(&backends.iter().map(|module| &module.name).collect::<Vec<_>>())
            .default(current)
            .interact()?;

        config.store = match backends[selection].key.as_str() {
            "rest" => {
                let existing = match &config.store {
                    StoreConfig::Rest(rest) => Some(rest.clone()),
                    StoreConfig::Sqlite { .. } => None,
                };
                StoreConfig::Rest(RestConfig::init(&existing)?)
            }
            _ => {
                msg_print!(Message::ConfigModuleSqlite);
                let default_path = match &config.store {
                    StoreConfig::Sqlite { path: Some(path) } => path.display().to_string(),
                    _ => String::new(),
                };
                let path: String = Input::with_theme(&theme)
                    .with_prompt(Message::PromptSqlitePath.to_string())
                    .default(default_path)
                    .allow_empty(true)
                    .interact_text()?;
                StoreConfig::Sqlite {
                    path: Some(path.trim()).filter(|p| !p.is_empty()).map(PathBuf::from),
                }
            }
        };

        let layouts = [Addressing::Shared, Addressing::PerChild];
        let layout = Select::with_theme(&theme)
            .with_prompt(Message::PromptAddressing.to_string())
            .items(&layouts)
            .default(if config.addressing == Addressing::PerChild { 1 } else { 0 })
            .interact()?;
        config.addressing = layouts[layout];

        let child: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptDefaultChild.to_string())
            .default(config.default_child.clone().unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;
        config.default_child = Some(child.trim().to_string()).filter(|c| !c.is_empty());

        let user_id: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptUserId.to_string())
            .default(config.user_id.clone().unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;
        config.user_id = Some(user_id.trim().to_string()).filter(|u| !u.is_empty());

        Ok(config)
    }
}
