//! Application settings and configuration management

use crate::backend::traits::Model;
use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub pollinations: PollinationsConfig,
    #[serde(default)]
    pub arta: ArtaConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telegram Bot API connection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
    /// Long-poll timeout passed to `getUpdates`
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
    /// Pause after a failed `getUpdates` call
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_retry_delay() -> u64 {
    5
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base: default_telegram_api_base(),
            poll_timeout_secs: default_poll_timeout(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

/// Request defaults and limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    #[serde(default = "default_dimension")]
    pub default_width: u32,
    #[serde(default = "default_dimension")]
    pub default_height: u32,
    #[serde(default)]
    pub default_model: Model,
    #[serde(default = "default_max_prompt_length")]
    pub max_prompt_length: usize,
}

fn default_dimension() -> u32 {
    1024
}

fn default_max_prompt_length() -> usize {
    400
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_width: default_dimension(),
            default_height: default_dimension(),
            default_model: Model::default(),
            max_prompt_length: default_max_prompt_length(),
        }
    }
}

/// Pollinations (primary provider)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollinationsConfig {
    #[serde(default = "default_pollinations_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_referer")]
    pub referer: String,
    #[serde(default = "default_seed_min")]
    pub seed_min: u32,
    #[serde(default = "default_seed_max")]
    pub seed_max: u32,
}

fn default_pollinations_base_url() -> String {
    "https://image.pollinations.ai/prompt/".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_referer() -> String {
    "telebot".to_string()
}

fn default_seed_min() -> u32 {
    10000
}

fn default_seed_max() -> u32 {
    99999
}

impl PollinationsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PollinationsConfig {
    fn default() -> Self {
        Self {
            base_url: default_pollinations_base_url(),
            timeout_secs: default_timeout(),
            referer: default_referer(),
            seed_min: default_seed_min(),
            seed_max: default_seed_max(),
        }
    }
}

/// Arta (fallback provider)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtaConfig {
    #[serde(default = "default_arta_auth_url")]
    pub auth_url: String,
    /// Public key of the identity service; supplied by config file or env
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_arta_generate_url")]
    pub generate_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_cfg_scale")]
    pub cfg_scale: String,
    #[serde(default = "default_steps")]
    pub steps: String,
    #[serde(default = "default_android_cert")]
    pub android_cert: String,
    #[serde(default = "default_firebase_gmpid")]
    pub firebase_gmpid: String,
    #[serde(default = "default_firebase_client")]
    pub firebase_client: String,
    #[serde(default = "default_auth_user_agent")]
    pub auth_user_agent: String,
    #[serde(default = "default_app_user_agent")]
    pub app_user_agent: String,
}

fn default_arta_auth_url() -> String {
    "https://www.googleapis.com/identitytoolkit/v3/relyingparty/signupNewUser".to_string()
}

fn default_arta_generate_url() -> String {
    "https://img-gen-prod.ai-arta.com/api/v1/text2image".to_string()
}

fn default_max_poll_attempts() -> u32 {
    30
}

fn default_poll_interval() -> u64 {
    5
}

fn default_cfg_scale() -> String {
    "7".to_string()
}

fn default_steps() -> String {
    "40".to_string()
}

fn default_android_cert() -> String {
    "ADC09FCA89A2CE4D0D139031A2A587FA87EE4155".to_string()
}

fn default_firebase_gmpid() -> String {
    "1:713239656559:android:f9e37753e9ee7324cb759a".to_string()
}

fn default_firebase_client() -> String {
    "H4sIAAAAAAAA_6tWykhNLCpJSk0sKVayio7VUSpLLSrOzM9TslIyUqoFAFyivEQfAAAA".to_string()
}

fn default_auth_user_agent() -> String {
    "Dalvik/2.1.0 (Linux; U; Android 15;)".to_string()
}

fn default_app_user_agent() -> String {
    "AiArt/4.18.6 okHttp/4.12.0 Android R".to_string()
}

impl ArtaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for ArtaConfig {
    fn default() -> Self {
        Self {
            auth_url: default_arta_auth_url(),
            api_key: String::new(),
            generate_url: default_arta_generate_url(),
            timeout_secs: default_timeout(),
            max_poll_attempts: default_max_poll_attempts(),
            poll_interval_secs: default_poll_interval(),
            cfg_scale: default_cfg_scale(),
            steps: default_steps(),
            android_cert: default_android_cert(),
            firebase_gmpid: default_firebase_gmpid(),
            firebase_client: default_firebase_client(),
            auth_user_agent: default_auth_user_agent(),
            app_user_agent: default_app_user_agent(),
        }
    }
}

/// Chat-facing texts
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    /// Markdown body of the `/admin` reply
    #[serde(default = "default_about_text")]
    pub about_text: String,
}

fn default_about_text() -> String {
    "🤖 *About This Bot*\n\nThis bot uses AI to generate images from text prompts.".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            about_text: default_about_text(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            // Load from configuration file
            .add_source(File::from(path.as_ref()).required(false))
            // Override with environment variables (prefixed with IMAGEGEN__)
            .add_source(
                Environment::with_prefix("IMAGEGEN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            // The conventional bot token variable wins over everything else
            .set_override_option("telegram.bot_token", std::env::var("BOT_TOKEN").ok())?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(invalid("BOT_TOKEN is not set"));
        }

        if self.arta.api_key.trim().is_empty() {
            return Err(invalid("arta.api_key must be configured"));
        }

        if self.generation.max_prompt_length == 0 {
            return Err(invalid("generation.max_prompt_length must be positive"));
        }

        if self.generation.default_width == 0 || self.generation.default_height == 0 {
            return Err(invalid("default image dimensions must be positive"));
        }

        if self.arta.max_poll_attempts == 0 {
            return Err(invalid("arta.max_poll_attempts must be at least 1"));
        }

        if self.pollinations.seed_min > self.pollinations.seed_max {
            return Err(invalid(&format!(
                "pollinations seed range is inverted ({} > {})",
                self.pollinations.seed_min, self.pollinations.seed_max
            )));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> AppError {
    AppError::Config(config::ConfigError::Message(message.to_string()))
}
