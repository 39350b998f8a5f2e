// Runtime configuration loaded from the environment
//
// `.env` is read first (see main), then individual variables. Unset
// variables fall back to defaults; set-but-unparsable ones are errors.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::agents::errors::{AgentError, AgentResult};
use crate::agents::llm::{
    ModelSettings, DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS,
};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub model: ModelSettings,
    /// Variables that were unset and fell back to their defaults
    pub defaulted: Vec<&'static str>,
}

impl AppConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> AgentResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Every variable that falls back to its default is logged at warn
    /// level and listed in `defaulted`. `LLM_MAX_TOKENS` has no default.
    pub fn from_lookup<F>(lookup: F) -> AgentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut defaulted = Vec::new();

        let bind_addr = parse_or(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR, &mut defaulted)?;
        let api_url = text_or(&lookup, "LLM_API_URL", DEFAULT_API_URL, &mut defaulted);
        let model = text_or(&lookup, "LLM_MODEL", DEFAULT_MODEL, &mut defaulted);
        let temperature: f32 = parse_or(
            &lookup,
            "LLM_TEMPERATURE",
            &DEFAULT_TEMPERATURE.to_string(),
            &mut defaulted,
        )?;
        let timeout_secs: u64 = parse_or(
            &lookup,
            "LLM_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
            &mut defaulted,
        )?;
        let max_tokens = match lookup("LLM_MAX_TOKENS") {
            Some(value) => Some(parse_value::<u32>("LLM_MAX_TOKENS", &value)?),
            None => None,
        };

        if !(0.0..=2.0).contains(&temperature) {
            return Err(AgentError::ConfigError(format!(
                "LLM_TEMPERATURE must be between 0 and 2, got {}",
                temperature
            )));
        }

        Ok(Self {
            bind_addr,
            model: ModelSettings {
                api_url,
                model,
                temperature,
                max_tokens,
                timeout: Duration::from_secs(timeout_secs),
            },
            defaulted,
        })
    }
}

fn text_or<F>(
    lookup: &F,
    key: &'static str,
    default: &str,
    defaulted: &mut Vec<&'static str>,
) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| {
        tracing::warn!("{} not set, using default {}", key, default);
        defaulted.push(key);
        default.to_string()
    })
}

fn parse_or<F, T>(
    lookup: &F,
    key: &'static str,
    default: &str,
    defaulted: &mut Vec<&'static str>,
) -> AgentResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &text_or(lookup, key, default, defaulted))
}

fn parse_value<T>(key: &str, value: &str) -> AgentResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AgentError::ConfigError(format!("Invalid {} '{}': {}", key, value, e)))
}
