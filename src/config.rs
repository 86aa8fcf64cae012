//! Application configuration.
//!
//! Layers, lowest precedence first: struct defaults, `config/default.toml`,
//! `SMS_RELAY__*` nested environment variables, then the flat
//! `SMS_RELAY_*` / `PORT` overrides below.

use anyhow::{bail, Context, Result};
use clickhouse_client::ClickHouseConfig;
use outbox::{MailConfig, OutboxConfig, SinkKind};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub outbox: OutboxConfig,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub clickhouse: ClickHouseConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            outbox: OutboxConfig::default(),
            mail: MailConfig::default(),
            clickhouse: ClickHouseConfig::default(),
        }
    }
}

impl Config {
    /// Fail startup on settings the relay cannot run with.
    pub fn validate(&self) -> Result<()> {
        if let Err(msg) = self.outbox.validate() {
            bail!("Invalid outbox configuration: {}", msg);
        }

        if self.outbox.sink == SinkKind::Mail
            && self.mail.to.as_deref().map_or(true, |to| to.trim().is_empty())
        {
            warn!("SMS_RELAY_MAIL_TO is not set; flushes will fail and records will stay buffered");
        }

        Ok(())
    }
}

/// Load configuration from files and environment.
pub fn load_config() -> Result<Config> {
    let config = ::config::Config::builder()
        .add_source(::config::Config::try_from(&Config::default())?)
        .add_source(
            ::config::File::with_name("config/default")
                .required(false)
                .format(::config::FileFormat::Toml),
        )
        .add_source(
            ::config::Environment::default()
                .separator("__")
                .prefix("SMS_RELAY")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("{}={:?}: {}", key, value, e))
}

/// Flat environment overrides. The nested `__` form does not play well with
/// underscored field names, so the common settings get explicit names.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT") {
        config.port = parse_var("PORT", &port)?;
    }

    if let Some(size) = lookup("SMS_RELAY_BATCH_SIZE") {
        config.outbox.batch_size = parse_var("SMS_RELAY_BATCH_SIZE", &size)?;
    }
    if let Some(secs) = lookup("SMS_RELAY_IDLE_WINDOW_SECS") {
        config.outbox.idle_window_secs = parse_var("SMS_RELAY_IDLE_WINDOW_SECS", &secs)?;
    }
    if let Some(sink) = lookup("SMS_RELAY_SINK") {
        config.outbox.sink = parse_var("SMS_RELAY_SINK", &sink)?;
    }
    if let Some(path) = lookup("SMS_RELAY_ARCHIVE_PATH") {
        config.outbox.archive_path = Some(path).filter(|p| !p.is_empty());
    }

    if let Some(url) = lookup("SMS_RELAY_MAIL_RELAY_URL") {
        config.mail.relay_url = url;
    }
    if let Some(key) = lookup("SMS_RELAY_MAIL_API_KEY") {
        config.mail.api_key = Some(key);
    }
    if let Some(from) = lookup("SMS_RELAY_MAIL_FROM") {
        config.mail.from = from;
    }
    if let Some(to) = lookup("SMS_RELAY_MAIL_TO") {
        config.mail.to = Some(to);
    }

    if let Some(url) = lookup("SMS_RELAY_CLICKHOUSE_URL") {
        config.clickhouse.url = url;
    }
    if let Some(database) = lookup("SMS_RELAY_CLICKHOUSE_DATABASE") {
        config.clickhouse.database = database;
    }
    if let Some(username) = lookup("SMS_RELAY_CLICKHOUSE_USERNAME") {
        config.clickhouse.username = Some(username);
    }
    if let Some(password) = lookup("SMS_RELAY_CLICKHOUSE_PASSWORD") {
        config.clickhouse.password = Some(password);
    }

    Ok(())
}
