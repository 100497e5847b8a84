//! Configuration management for Stepline.
//!
//! Configuration can be set via environment variables:
//! - `OPENROUTER_API_KEY` - Required. Your OpenRouter API key.
//! - `DEFAULT_MODEL` - Optional. The model to drive. Defaults to `openai/gpt-4.1-mini`.
//! - `WORKSPACE_PATH` - Optional. Directory tools operate in. Defaults to the current directory.
//! - `MAX_STEPS` - Optional. Maximum loop iterations per run. Defaults to `50`.
//! - `GATEWAY_TIMEOUT_SECS` - Optional. Per completion call. Defaults to `120`.
//! - `TOOL_TIMEOUT_SECS` - Optional. Per tool dispatch. Defaults to `60`.
//! - `MAX_FAILURE_STREAK` - Optional. Consecutive identical dispatch failures
//!   tolerated before the run is aborted. Defaults to `3`.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenRouter API key
    pub api_key: String,

    /// Model identifier (OpenRouter format)
    pub model: String,

    /// Workspace directory for tool side effects
    pub workspace_path: PathBuf,

    /// Maximum loop iterations per run
    pub max_steps: usize,

    /// Timeout for each completion gateway call (fatal when exceeded)
    pub gateway_timeout: Duration,

    /// Timeout for each tool dispatch (recoverable when exceeded)
    pub tool_timeout: Duration,

    /// Consecutive identical dispatch failures before the run is aborted
    pub max_failure_streak: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENROUTER_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let model = std::env::var("DEFAULT_MODEL")
            .unwrap_or_else(|_| "openai/gpt-4.1-mini".to_string());

        let workspace_path = std::env::var("WORKSPACE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let max_steps = parse_env("MAX_STEPS", 50usize)?;
        let gateway_timeout = Duration::from_secs(parse_env("GATEWAY_TIMEOUT_SECS", 120u64)?);
        let tool_timeout = Duration::from_secs(parse_env("TOOL_TIMEOUT_SECS", 60u64)?);
        let max_failure_streak = parse_env("MAX_FAILURE_STREAK", 3u32)?;

        Ok(Self {
            api_key,
            model,
            workspace_path,
            max_steps,
            gateway_timeout,
            tool_timeout,
            max_failure_streak,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, model: String, workspace_path: PathBuf) -> Self {
        Self {
            api_key,
            model,
            workspace_path,
            max_steps: 50,
            gateway_timeout: Duration::from_secs(120),
            tool_timeout: Duration::from_secs(60),
            max_failure_streak: 3,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}
