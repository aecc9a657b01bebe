//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The
//! `.env` file is used for local development. Vendor API keys are optional:
//! the fallback chain is built from whichever vendors have a key present, in
//! priority order.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub cors_origin: String,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub deepseek_api_key: Option<String>,
    pub youtube_api_key: Option<String>,
    pub gemini_model: String,
    pub openai_model: String,
    pub deepseek_model: String,
    /// Target language for the lesson translation endpoint.
    pub translation_language: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for
    /// development, but this is skipped in test environments to ensure tests
    /// are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        // --- Load API Keys (as optional) ---
        let gemini_api_key = std::env::var("GEMINI_API_KEY").ok();
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let deepseek_api_key = std::env::var("DEEPSEEK_API_KEY").ok();
        let youtube_api_key = std::env::var("YOUTUBE_API_KEY").ok();

        // --- Load Adapter-specific Settings ---
        let gemini_model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());
        let openai_model =
            std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());
        let deepseek_model =
            std::env::var("DEEPSEEK_MODEL").unwrap_or_else(|_| "deepseek-chat".to_string());
        let translation_language =
            std::env::var("TRANSLATION_LANGUAGE").unwrap_or_else(|_| "Hinglish".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            cors_origin,
            gemini_api_key,
            openai_api_key,
            deepseek_api_key,
            youtube_api_key,
            gemini_model,
            openai_model,
            deepseek_model,
            translation_language,
        })
    }
}
