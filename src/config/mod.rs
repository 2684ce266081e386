use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Portal account login. Required; also settable via `PORTAL_LOGIN`.
    #[serde(default)]
    pub login: String,
    /// Portal account password. Required; also settable via `PORTAL_PASSWORD`.
    #[serde(default)]
    pub password: String,
    /// Timeout for every portal HTTP call, in seconds (default: 30)
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            login: String::new(),
            password: String::new(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://panel.kuchniavikinga.pl".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct NotificationConfig {
    /// Webhook URL alerts are posted to. Required; also settable via
    /// `ALERT_WEBHOOK_URL`.
    #[serde(default)]
    pub webhook_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// Substrings matched case-insensitively against ingredient names.
    #[serde(default = "default_allergen_keywords")]
    pub allergen_keywords: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            allergen_keywords: default_allergen_keywords(),
        }
    }
}

fn default_allergen_keywords() -> Vec<String> {
    vec!["ryba".to_string(), "skorupiaki".to_string()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// How many upcoming deliveries to check per run (default: 3)
    #[serde(default = "default_delivery_limit")]
    pub delivery_limit: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            delivery_limit: default_delivery_limit(),
        }
    }
}

fn default_delivery_limit() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file if present, then apply
    /// environment-variable overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content).with_context(|| "Failed to parse configuration file")?
        } else {
            info!("No config file found, using defaults");
            Config::default()
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(value) = std::env::var("PORTAL_BASE_URL") {
            self.portal.base_url = value;
        }
        if let Ok(value) = std::env::var("PORTAL_LOGIN") {
            self.portal.login = value;
        }
        if let Ok(value) = std::env::var("PORTAL_PASSWORD") {
            self.portal.password = value;
        }
        if let Ok(value) = std::env::var("ALERT_WEBHOOK_URL") {
            self.notifications.webhook_url = value;
        }
    }

    /// Missing credentials or webhook URL are fatal at startup, before any
    /// network call is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.portal.login.is_empty() {
            bail!("portal login is not set (config [portal].login or PORTAL_LOGIN)");
        }
        if self.portal.password.is_empty() {
            bail!("portal password is not set (config [portal].password or PORTAL_PASSWORD)");
        }
        if self.notifications.webhook_url.is_empty() {
            bail!("webhook URL is not set (config [notifications].webhook_url or ALERT_WEBHOOK_URL)");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal: PortalConfig::default(),
            notifications: NotificationConfig::default(),
            scanner: ScannerConfig::default(),
            watch: WatchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
