//! # Configuration Module
//!
//! This module defines the configuration structures for the bot: the two
//! required secrets, the inference service endpoint, the models used by the
//! enhancement pipeline and the branding shown to users.

use reqwest::Url;
use std::str::FromStr;

use crate::inference::ModelRef;

// Environment variable names
pub const TELEGRAM_BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const REPLICATE_API_TOKEN_VAR: &str = "REPLICATE_API_TOKEN";
pub const TELEGRAM_API_URL_VAR: &str = "TELEGRAM_API_URL";
pub const REPLICATE_API_URL_VAR: &str = "REPLICATE_API_URL";
pub const REPLICATE_POLL_INTERVAL_VAR: &str = "REPLICATE_POLL_INTERVAL_MS";
pub const UPSCALE_MODEL_VAR: &str = "UPSCALE_MODEL";
pub const RESTORE_MODEL_VAR: &str = "RESTORE_MODEL";
pub const BOT_USERNAME_VAR: &str = "BOT_USERNAME";
pub const CREDIT_HANDLE_VAR: &str = "CREDIT_HANDLE";
pub const CREDIT_URL_VAR: &str = "CREDIT_URL";

// Defaults
pub const DEFAULT_REPLICATE_API_URL: &str = "https://api.replicate.com/v1";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_UPSCALE_OWNER: &str = "nightmareai";
pub const DEFAULT_UPSCALE_NAME: &str = "real-esrgan";
pub const DEFAULT_RESTORE_OWNER: &str = "tencentarc";
pub const DEFAULT_RESTORE_NAME: &str = "gfpgan";
pub const UPSCALE_FACTOR: u32 = 4;
pub const DEFAULT_BOT_USERNAME: &str = "@ReminiAIPhotoEnhancer_bot";
pub const DEFAULT_CREDIT_HANDLE: &str = "@CipherShivamX";
pub const DEFAULT_CREDIT_URL: &str = "https://t.me/CipherShivamX";

/// Configuration errors; all of them abort startup
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required variable is unset or blank
    MissingVariable(&'static str),
    /// An optional variable is set to something unusable
    Invalid { key: &'static str, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(key) => {
                write!(f, "Missing required environment variable {key}")
            }
            ConfigError::Invalid { key, reason } => write!(f, "Invalid value for {key}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Inference service connection settings
#[derive(Debug, Clone)]
pub struct ReplicateConfig {
    /// Base URL of the HTTP API, without trailing slash
    pub api_url: String,
    pub api_token: String,
    /// Delay between prediction status polls in milliseconds
    pub poll_interval_ms: u64,
}

/// Models and parameters used by the enhancement pipeline
#[derive(Debug, Clone)]
pub struct EnhancementConfig {
    pub upscale_model: ModelRef,
    pub restore_model: ModelRef,
    pub scale: u32,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            upscale_model: ModelRef::new(DEFAULT_UPSCALE_OWNER, DEFAULT_UPSCALE_NAME),
            restore_model: ModelRef::new(DEFAULT_RESTORE_OWNER, DEFAULT_RESTORE_NAME),
            scale: UPSCALE_FACTOR,
        }
    }
}

/// Names and links shown in the welcome text, menu and captions
#[derive(Debug, Clone)]
pub struct BrandingConfig {
    pub bot_username: String,
    pub credit_handle: String,
    pub credit_url: Url,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            bot_username: DEFAULT_BOT_USERNAME.to_string(),
            credit_handle: DEFAULT_CREDIT_HANDLE.to_string(),
            credit_url: Url::parse(DEFAULT_CREDIT_URL).expect("default credit URL is valid"),
        }
    }
}

/// Complete bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    /// Custom Bot API server; teloxide's default is used when absent
    pub telegram_api_url: Option<Url>,
    pub replicate: ReplicateConfig,
    pub enhancement: EnhancementConfig,
    pub branding: BrandingConfig,
}

impl BotConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| value(key).ok_or(ConfigError::MissingVariable(key));

        let telegram_token = required(TELEGRAM_BOT_TOKEN_VAR)?;
        let api_token = required(REPLICATE_API_TOKEN_VAR)?;

        let telegram_api_url = value(TELEGRAM_API_URL_VAR)
            .map(|raw| parse_url(TELEGRAM_API_URL_VAR, &raw))
            .transpose()?;

        let replicate_api_url = match value(REPLICATE_API_URL_VAR) {
            Some(raw) => parse_url(REPLICATE_API_URL_VAR, &raw)?.to_string(),
            None => DEFAULT_REPLICATE_API_URL.to_string(),
        };

        let poll_interval_ms = match value(REPLICATE_POLL_INTERVAL_VAR) {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: REPLICATE_POLL_INTERVAL_VAR,
                reason: e.to_string(),
            })?,
            None => DEFAULT_POLL_INTERVAL_MS,
        };

        let defaults = EnhancementConfig::default();
        let enhancement = EnhancementConfig {
            upscale_model: parse_model(UPSCALE_MODEL_VAR, value(UPSCALE_MODEL_VAR))?
                .unwrap_or(defaults.upscale_model),
            restore_model: parse_model(RESTORE_MODEL_VAR, value(RESTORE_MODEL_VAR))?
                .unwrap_or(defaults.restore_model),
            scale: defaults.scale,
        };

        let default_branding = BrandingConfig::default();
        let branding = BrandingConfig {
            bot_username: value(BOT_USERNAME_VAR).unwrap_or(default_branding.bot_username),
            credit_handle: value(CREDIT_HANDLE_VAR).unwrap_or(default_branding.credit_handle),
            credit_url: match value(CREDIT_URL_VAR) {
                Some(raw) => parse_url(CREDIT_URL_VAR, &raw)?,
                None => default_branding.credit_url,
            },
        };

        Ok(Self {
            telegram_token,
            telegram_api_url,
            replicate: ReplicateConfig {
                api_url: replicate_api_url.trim_end_matches('/').to_string(),
                api_token,
                poll_interval_ms,
            },
            enhancement,
            branding,
        })
    }
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn parse_model(key: &'static str, raw: Option<String>) -> Result<Option<ModelRef>, ConfigError> {
    raw.map(|raw| {
        ModelRef::from_str(&raw).map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
    })
    .transpose()
}
