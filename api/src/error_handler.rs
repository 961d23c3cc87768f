use ai_llm_service::AiLlmError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use query_pipeline::PipelineError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("{0}")]
    Config(String),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("{0}")]
    BadRequest(String),

    // --- Completion provider ---
    /// Provider failure; `status` is the provider's own status when it sent one.
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("{0}")]
    UpstreamTimeout(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // 4xx
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,

            // custom mapped
            AppError::Upstream { status, .. } => *status,
            AppError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,

            // 5xx
            AppError::Config(_)
            | AppError::Bind(_)
            | AppError::Server(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Upstream { .. } => "UPSTREAM_ERROR",
            AppError::UpstreamTimeout(_) => "UPSTREAM_TIMEOUT",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    code: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.error_code(), %status, error = %self, "request failed");
        } else {
            warn!(code = self.error_code(), %status, error = %self, "request rejected");
        }
        let body = ErrorBody {
            error: self.to_string(),
            code: self.error_code(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::MalformedInput(msg) => AppError::BadRequest(msg),
            e @ (PipelineError::InvalidConfig { .. } | PipelineError::InvalidTemplate(_)) => {
                AppError::Config(e.to_string())
            }
            PipelineError::Corpus(e) => AppError::Internal(e.to_string()),
            PipelineError::Llm(e) => e.into(),
        }
    }
}

/// Provider errors keep the provider's status when it is an error status.
/// A provider 401 means the configured key was rejected and is reported as
/// a configuration error.
impl From<AiLlmError> for AppError {
    fn from(err: AiLlmError) -> Self {
        if err.is_config() {
            return AppError::Config(err.to_string());
        }
        let timed_out = match &err {
            AiLlmError::Timeout(_) => true,
            AiLlmError::HttpTransport(e) => e.is_timeout(),
            _ => false,
        };
        if timed_out {
            return AppError::UpstreamTimeout(err.to_string());
        }

        match err.upstream_status() {
            Some(StatusCode::UNAUTHORIZED) => AppError::Config(format!(
                "completion provider rejected the configured credentials: {err}"
            )),
            Some(s) if s.is_client_error() || s.is_server_error() => AppError::Upstream {
                status: s,
                message: err.to_string(),
            },
            _ => AppError::Upstream {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ai_llm_service::{ConfigError, HttpError, ProviderError};

    use super::*;

    fn http(status: u16) -> AiLlmError {
        AiLlmError::Provider(ProviderError::HttpStatus(HttpError {
            status: StatusCode::from_u16(status).unwrap(),
            url: "http://upstream/v1/chat/completions".into(),
            snippet: "nope".into(),
        }))
    }

    #[test]
    fn upstream_status_passes_through() {
        let e: AppError = http(429).into();
        assert_eq!(e.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(e.error_code(), "UPSTREAM_ERROR");

        let e: AppError = http(503).into();
        assert_eq!(e.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn rejected_key_is_a_config_error() {
        let e: AppError = http(401).into();
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn statusless_failures_default_to_500() {
        let e: AppError = AiLlmError::Provider(ProviderError::EmptyChoices).into();
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.error_code(), "UPSTREAM_ERROR");
    }

    #[test]
    fn timeout_maps_to_504() {
        let e: AppError = AiLlmError::Timeout(Duration::from_secs(30)).into();
        assert_eq!(e.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn pipeline_errors() {
        let e: AppError = PipelineError::MalformedInput("empty".into()).into();
        assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);

        let e: AppError =
            PipelineError::Llm(AiLlmError::Config(ConfigError::MissingVar("OPENAI_API_KEY")))
                .into();
        assert_eq!(e.error_code(), "CONFIG_ERROR");
        assert!(e.to_string().contains("OPENAI_API_KEY"));
    }
}
