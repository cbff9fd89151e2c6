use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    #[serde(default)]
    pub base_url: String,
    pub token: Option<String>, // Optional when stored in the keyring
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SyncConfig {
    /// How often the daily total is re-fetched
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_clock_tick_millis")]
    pub clock_tick_millis: u64,
    #[serde(default = "default_session_ended_event")]
    pub session_ended_event: String,
    /// First retry delay after the event stream closes
    #[serde(default = "default_resubscribe_delay_millis")]
    pub resubscribe_delay_millis: u64,
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_clock_tick_millis() -> u64 {
    1000
}

fn default_resubscribe_delay_millis() -> u64 {
    1000
}

fn default_session_ended_event() -> String {
    crate::backend::SESSION_ENDED_EVENT.to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            clock_tick_millis: default_clock_tick_millis(),
            session_ended_event: default_session_ended_event(),
            resubscribe_delay_millis: default_resubscribe_delay_millis(),
        }
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn clock_tick(&self) -> Duration {
        Duration::from_millis(self.clock_tick_millis)
    }

    pub fn resubscribe_delay(&self) -> Duration {
        Duration::from_millis(self.resubscribe_delay_millis)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            anyhow::bail!("sync.poll_interval_secs must be greater than 0");
        }
        if self.clock_tick_millis == 0 {
            anyhow::bail!("sync.clock_tick_millis must be greater than 0");
        }
        if self.resubscribe_delay_millis == 0 {
            anyhow::bail!("sync.resubscribe_delay_millis must be greater than 0");
        }
        if self.session_ended_event.trim().is_empty() {
            anyhow::bail!("sync.session_ended_event must not be empty");
        }
        Ok(())
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            anyhow::bail!("backend.request_timeout_secs must be greater than 0");
        }
        if self.base_url.is_empty() {
            return Ok(()); // Checked when a command needs the backend
        }
        reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid backend.base_url '{}'", self.base_url))?;
        Ok(())
    }
}

impl Config {
    /// Get the backend token from keyring or config
    pub fn backend_token(&self) -> Result<String> {
        if let Ok(token) = crate::keyring::get_backend_token() {
            return Ok(token);
        }

        if let Some(token) = &self.backend.token {
            return Ok(token.clone());
        }

        anyhow::bail!("Backend token not found. Run 'tcsync auth login --token <TOKEN>' to configure")
    }

    pub fn validate(&self) -> Result<()> {
        self.backend.validate()?;
        self.sync.validate()?;
        Ok(())
    }
}

/// Load a TOML config file, overlaid with `TCSYNC__SECTION__KEY` variables.
///
/// A missing file is not an error: defaults plus the environment apply.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
    let loader = ConfigBuilder::builder()
        .add_source(
            File::from(path.as_ref())
                .format(FileFormat::Toml)
                .required(false),
        )
        .add_source(
            Environment::with_prefix("TCSYNC")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build config loader")?;

    loader
        .try_deserialize()
        .context("Failed to parse config file")
}

/// Resolve, load and validate the configuration.
///
/// An explicit `--config` path must exist. Parse and validation errors are
/// returned, never replaced by defaults.
pub fn load(override_path: Option<&PathBuf>) -> Result<Config> {
    if let Some(path) = override_path {
        if !path.exists() {
            anyhow::bail!("Config file {} does not exist", path.display());
        }
    }
    let config_path = crate::platform::config_path(override_path)?;

    let config = load_from_path(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    Ok(config)
}
