//! Unified error handling for `ai-llm-service`.
//!
//! This module exposes a single top-level error type [`AiLlmError`] for the whole
//! library, and groups domain-specific errors in nested enums ([`ConfigError`],
//! [`ProviderError`]). Small helpers for reading/validating configuration values
//! are provided and return the unified [`Result<T>`] alias.
//!
//! All messages include the suffix `[AI LLM Service]` to simplify attribution in logs.

use std::{fmt, str::FromStr, time::Duration};

use reqwest::StatusCode;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, AiLlmError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `ai-llm-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    /// Configuration/validation errors (startup).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The provider rejected the request or answered with something unusable.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Underlying HTTP transport error (e.g., `reqwest::Error`).
    #[error("[AI LLM Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// Operation exceeded the configured timeout.
    #[error("[AI LLM Service] operation timed out after {0:?}")]
    Timeout(Duration),
}

impl AiLlmError {
    /// HTTP status reported by the upstream service, when there was one.
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            AiLlmError::Provider(ProviderError::HttpStatus(e)) => Some(e.status),
            AiLlmError::HttpTransport(e) => e.status(),
            _ => None,
        }
    }

    /// `true` for errors caused by missing or invalid local configuration.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            AiLlmError::Config(_)
                | AiLlmError::Provider(ProviderError::MissingApiKey)
                | AiLlmError::Provider(ProviderError::InvalidEndpoint(_))
                | AiLlmError::Provider(ProviderError::InvalidApiKey(_))
        )
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
///
/// Keep this focused: only errors that realistically happen at config
/// load/validation time.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("[AI LLM Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number or flag failed to parse (like limits, timeouts).
    #[error("[AI LLM Service] invalid value in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `LLM_MAX_TOKENS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u32`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[AI LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `OPENAI_URL`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[AI LLM Service] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `temperature`).
        field: &'static str,
        /// Description of the expected range (e.g., `expected 0.0..=2.0`).
        detail: &'static str,
    },

    /// Model name was empty.
    #[error("[AI LLM Service] model name must not be empty")]
    EmptyModel,
}

/* ------------------------------------------------------------------------- */
/* Provider errors                                                           */
/* ------------------------------------------------------------------------- */

/// Non-success HTTP answer from the provider.
#[derive(Debug, Clone)]
pub struct HttpError {
    pub status: StatusCode,
    pub url: String,
    /// Short, trimmed snippet of the response body.
    pub snippet: String,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} from {}: {}", self.status, self.url, self.snippet)
    }
}

/// Errors raised while talking to the completion provider.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No API key configured.
    #[error("[AI LLM Service] OpenAI API key is missing")]
    MissingApiKey,

    /// The API key cannot be used as a header value.
    #[error("[AI LLM Service] invalid API key: {0}")]
    InvalidApiKey(String),

    /// The endpoint is empty or does not start with http/https.
    #[error("[AI LLM Service] invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Upstream returned a non-successful HTTP status.
    #[error("[AI LLM Service] {0}")]
    HttpStatus(HttpError),

    /// Response payload could not be decoded as expected.
    #[error("[AI LLM Service] decode error: {0}")]
    Decode(String),

    /// Completion contained no choices.
    #[error("[AI LLM Service] completion returned no choices")]
    EmptyChoices,

    /// The provider reported an error inside an open stream.
    #[error("[AI LLM Service] upstream stream error: {0}")]
    Upstream(String),
}

/// Trims a response body to a log- and client-friendly snippet.
pub fn make_snippet(text: &str) -> String {
    const MAX: usize = 300;
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(MAX).collect();
    out.push('…');
    out
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Fetches a required, non-empty variable through `lookup`.
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::MissingVar`] if the
/// variable is absent or empty.
pub fn must_env<F>(lookup: &F, name: &'static str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Fetches an optional variable, treating empty values as unset.
pub fn env_opt<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|v| !v.trim().is_empty())
}

/// Parses an optional value (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::InvalidNumber`] if the
/// variable is set but does not parse as `T`.
pub fn env_opt_parse<F, T>(lookup: &F, name: &'static str, reason: &'static str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match env_opt(lookup, name) {
        Some(v) => v.trim().parse::<T>().map(Some).map_err(|_| {
            AiLlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason,
            })
        }),
        None => Ok(None),
    }
}

/// Parses an optional boolean flag (`true/false/1/0/yes/no`).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] for any other value.
pub fn env_opt_bool<F>(lookup: &F, name: &'static str) -> Result<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(v) = env_opt(lookup, name) else {
        return Ok(None);
    };
    match v.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidNumber {
            var: name,
            reason: "expected true or false",
        }
        .into()),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers (return unified `Result<T>`)                           */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::InvalidFormat`] when
/// the string does not start with a valid HTTP scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Validates that a floating-point value lies within an inclusive range.
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::OutOfRange`] if `value`
/// is outside `[min, max]`.
pub fn validate_range_f32(
    field: &'static str,
    detail: &'static str,
    value: f32,
    min: f32,
    max: f32,
) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, detail }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_is_trimmed_and_clamped() {
        assert_eq!(make_snippet("  boom \n"), "boom");
        let long = "x".repeat(500);
        let s = make_snippet(&long);
        assert_eq!(s.chars().count(), 301);
        assert!(s.ends_with('…'));
    }

    #[test]
    fn upstream_status_only_for_http_errors() {
        let err = AiLlmError::from(ProviderError::HttpStatus(HttpError {
            status: StatusCode::TOO_MANY_REQUESTS,
            url: "http://x/v1/chat/completions".into(),
            snippet: "slow down".into(),
        }));
        assert_eq!(err.upstream_status(), Some(StatusCode::TOO_MANY_REQUESTS));
        assert!(!err.is_config());

        let err = AiLlmError::Timeout(Duration::from_secs(1));
        assert_eq!(err.upstream_status(), None);
        assert!(AiLlmError::from(ProviderError::MissingApiKey).is_config());
    }

    #[test]
    fn bool_flags_parse() {
        let lookup = |name: &str| (name == "FLAG").then(|| "No".to_string());
        assert_eq!(env_opt_bool(&lookup, "FLAG").unwrap(), Some(false));
        assert_eq!(env_opt_bool(&lookup, "OTHER").unwrap(), None);

        let bad = |_: &str| Some("maybe".to_string());
        assert!(env_opt_bool(&bad, "FLAG").is_err());
    }
}
