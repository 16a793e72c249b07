use adapter::{NotifierConfig, WebhookConfig};
use anyhow::Context;
use config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const ENV_PREFIX: &str = "NEWSDESK_";

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub notifier: NotifierSettings,
    pub content: ContentSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotifierMode {
    Log,
    Webhook,
}

#[derive(Deserialize, Clone, Debug)]
pub struct NotifierSettings {
    pub mode: NotifierMode,
    pub webhook_url: Option<String>,
    pub timeout_secs: u64,
    pub queue_capacity: usize,
}

impl NotifierSettings {
    pub fn to_config(&self) -> anyhow::Result<NotifierConfig> {
        match self.mode {
            NotifierMode::Log => Ok(NotifierConfig::Log),
            NotifierMode::Webhook => {
                let url = self
                    .webhook_url
                    .clone()
                    .filter(|u| !u.is_empty())
                    .context("notifier.webhook_url is required in webhook mode")?;
                Ok(NotifierConfig::Webhook(WebhookConfig {
                    url,
                    timeout: Duration::from_secs(self.timeout_secs),
                }))
            }
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ContentSettings {
    pub default_formatter: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        Self::load(&run_mode, collect_env_vars(std::env::vars()))
    }

    /// Defaults, then `config.toml`, then `config.{run_mode}.toml`, then the
    /// already-collected environment overrides.
    pub fn load(run_mode: &str, env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let env_json = serde_json::to_string(&env_map)
            .map_err(|e| ConfigError::Foreign(Box::new(e)))?;

        let s = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", "*")?
            .set_default("database.url", "sqlite://data/newsdesk.db")?
            .set_default("notifier.mode", "log")?
            .set_default("notifier.timeout_secs", 5)?
            .set_default("notifier.queue_capacity", 256)?
            .set_default("content.default_formatter", "markdown")?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(config::File::from_str(&env_json, config::FileFormat::Json))
            .build()?;

        s.try_deserialize()
    }
}

/// `NEWSDESK_SERVER__PORT=8080` becomes `server.port = "8080"`.
pub fn collect_env_vars(vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
    vars.filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches(ENV_PREFIX)
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}
