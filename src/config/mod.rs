use anyhow::{Context, Result, bail};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
}

/// football-data.org client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Plain-HTTP page scraping configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Headless browser configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowserConfig {
    #[serde(default = "default_browser_base_url")]
    pub base_url: String,

    /// Upper bound on waiting for match elements to render.
    #[serde(default = "default_render_wait_secs")]
    pub render_wait_secs: u64,

    /// Grace period for each browser teardown step before the process is killed.
    #[serde(default = "default_close_wait_secs")]
    pub close_wait_secs: u64,

    /// Explicit Chromium binary; auto-detected when unset.
    #[serde(default)]
    pub executable: Option<String>,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_api_base_url() -> String {
    "https://api.football-data.org/v4".to_string()
}
fn default_browser_base_url() -> String {
    "https://www.flashscore.com".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_render_wait_secs() -> u64 {
    15
}
fn default_close_wait_secs() -> u64 {
    5
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
        .to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            base_url: default_browser_base_url(),
            render_wait_secs: default_render_wait_secs(),
            close_wait_secs: default_close_wait_secs(),
            executable: None,
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("FIXTURES").separator("__"))
            .build()
            .context("Failed to assemble configuration sources")?;

        cfg.try_deserialize()
            .context("Invalid configuration values")
    }
}

// ── Secrets ──────────────────────────────────────────────────────────────────

pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
pub const API_KEY_VAR: &str = "FOOTBALL_API_KEY";
const LEGACY_API_KEY_VAR: &str = "API_KEY";

/// Credentials required before the bot may serve anything.
pub struct Secrets {
    pub telegram_token: SecretString,
    pub api_key: SecretString,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets").finish_non_exhaustive()
    }
}

impl Secrets {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name: &str| std::env::var(name).ok())
    }

    /// Only the API key; enough for one-shot lookups that never touch Telegram.
    pub fn api_key_from_env() -> Result<SecretString> {
        dotenv::dotenv().ok();
        api_key(&|name: &str| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_token = required(&lookup, TELEGRAM_TOKEN_VAR)?;
        let api_key = api_key(&lookup)?;
        Ok(Self {
            telegram_token: SecretString::new(telegram_token),
            api_key,
        })
    }
}

fn api_key(lookup: &impl Fn(&str) -> Option<String>) -> Result<SecretString> {
    let key = required(lookup, API_KEY_VAR)
        .or_else(|_| required(lookup, LEGACY_API_KEY_VAR))
        .with_context(|| format!("{} is not set", API_KEY_VAR))?;
    Ok(SecretString::new(key))
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    match lookup(name).map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => bail!("required environment variable {} is missing or empty", name),
    }
}
