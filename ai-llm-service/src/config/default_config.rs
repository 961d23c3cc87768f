//! Default LLM config loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! - `OPENAI_API_KEY`       = bearer token (mandatory)
//! - `OPENAI_URL`           = API base, default `https://api.openai.com`
//! - `OPENAI_MODEL`         = model id, default `gpt-3.5-turbo`
//! - `LLM_TEMPERATURE`      = sampling temperature, default `0.2`
//! - `LLM_TOP_P`            = optional nucleus sampling cutoff
//! - `LLM_MAX_TOKENS`       = optional max tokens (u32)
//! - `LLM_STREAM`           = streaming flag, default `true`
//! - `LLM_TIMEOUT_SECS`     = total request timeout, default `120`
//! - `LLM_STREAM_IDLE_SECS` = max wait between fragments, default `30`

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{
        AiLlmError, ConfigError, env_opt, env_opt_bool, env_opt_parse, must_env,
        validate_http_endpoint, validate_range_f32,
    },
};

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_STREAM_IDLE_SECS: u64 = 30;

/// Constructs the chat model config from the process environment.
///
/// # Errors
/// See [`config_openai_chat_from`].
pub fn config_openai_chat() -> Result<LlmModelConfig, AiLlmError> {
    config_openai_chat_from(|name| std::env::var(name).ok())
}

/// Constructs the chat model config from an arbitrary variable lookup.
///
/// # Errors
///
/// - [`ConfigError::MissingVar`] if `OPENAI_API_KEY` is missing or empty
/// - [`ConfigError::InvalidFormat`] if `OPENAI_URL` is not http(s)
/// - [`ConfigError::InvalidNumber`] for unparsable numbers or flags
/// - [`ConfigError::OutOfRange`] for temperature/top_p outside their range
pub fn config_openai_chat_from<F>(lookup: F) -> Result<LlmModelConfig, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = must_env(&lookup, "OPENAI_API_KEY")?;

    let endpoint = env_opt(&lookup, "OPENAI_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.into());
    validate_http_endpoint("OPENAI_URL", endpoint.trim())?;

    let model = env_opt(&lookup, "OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into());
    if model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }

    let temperature = env_opt_parse::<_, f32>(&lookup, "LLM_TEMPERATURE", "expected f32")?
        .unwrap_or(DEFAULT_TEMPERATURE);
    validate_range_f32("temperature", "expected 0.0..=2.0", temperature, 0.0, 2.0)?;

    let top_p = env_opt_parse::<_, f32>(&lookup, "LLM_TOP_P", "expected f32")?;
    if let Some(p) = top_p {
        validate_range_f32("top_p", "expected 0.0..=1.0", p, 0.0, 1.0)?;
    }

    let max_tokens = env_opt_parse::<_, u32>(&lookup, "LLM_MAX_TOKENS", "expected u32")?;
    let stream = env_opt_bool(&lookup, "LLM_STREAM")?.unwrap_or(true);
    let timeout_secs = env_opt_parse::<_, u64>(&lookup, "LLM_TIMEOUT_SECS", "expected u64")?
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let stream_idle_secs =
        env_opt_parse::<_, u64>(&lookup, "LLM_STREAM_IDLE_SECS", "expected u64")?
            .unwrap_or(DEFAULT_STREAM_IDLE_SECS);
    if timeout_secs == 0 {
        return Err(ConfigError::OutOfRange {
            field: "timeout_secs",
            detail: "expected > 0",
        }
        .into());
    }
    if stream_idle_secs == 0 {
        return Err(ConfigError::OutOfRange {
            field: "stream_idle_secs",
            detail: "expected > 0",
        }
        .into());
    }

    Ok(LlmModelConfig {
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens,
        temperature: Some(temperature),
        top_p,
        stream,
        timeout_secs: Some(timeout_secs),
        stream_idle_secs: Some(stream_idle_secs),
    })
}
