use anyhow::{Context, Result};
use deckbox_sync_core::SyncConfig;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub mongo: MongoConfig,

    #[serde(default)]
    pub deckbox: DeckboxCredentials,

    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DeckboxCredentials {
    pub base_url: String,
    /// Deckbox account used for the authenticated CSV export. Empty means
    /// unconfigured; commands that need the remote source will refuse to run.
    pub login: String,
    pub password: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017".to_string(),
            database: "deckbox_sync".to_string(),
        }
    }
}

impl Default for DeckboxCredentials {
    fn default() -> Self {
        Self {
            base_url: deckbox_sync_core::fetch::deckbox::DEFAULT_BASE_URL.to_string(),
            login: String::new(),
            password: String::new(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.sync.validate().context("invalid [sync] section")?;
        Ok(())
    }
}

/// Configuration manager that handles XDG-compliant paths and layered
/// configuration.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a ConfigManager with a specific path (for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    pub fn get_config_path(&self) -> PathBuf {
        self.config_path.clone()
    }

    fn default_config_path() -> PathBuf {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("deckbox-sync/config.toml");
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("deckbox-sync/config.toml")
    }

    /// Load configuration with layered priority: ENV > File > Defaults
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if self.config_path.exists() {
            figment = figment.merge(Toml::file(&self.config_path));
        }

        figment = figment.merge(Env::prefixed("DECKBOX_").split("__"));

        let config: AppConfig = figment.extract().context("failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// List all configuration values as dotted key/value pairs.
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        let config = self.load()?;
        let toml_string = toml::to_string(&config)?;
        let value: toml::Value = toml::from_str(&toml_string)?;

        let mut items = Vec::new();
        Self::collect_values(&value, String::new(), &mut items);
        items.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(items)
    }

    fn collect_values(value: &toml::Value, prefix: String, items: &mut Vec<(String, String)>) {
        match value {
            toml::Value::Table(table) => {
                for (key, val) in table {
                    let new_prefix = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}.{key}")
                    };
                    Self::collect_values(val, new_prefix, items);
                }
            }
            toml::Value::String(s) => items.push((prefix, s.clone())),
            toml::Value::Integer(i) => items.push((prefix, i.to_string())),
            toml::Value::Float(f) => items.push((prefix, f.to_string())),
            toml::Value::Boolean(b) => items.push((prefix, b.to_string())),
            _ => {}
        }
    }
}
