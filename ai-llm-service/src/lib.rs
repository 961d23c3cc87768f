//! LLM completion client for the professor reviews service.
//!
//! - [`config`]: model config and env-driven constructors
//! - [`services::open_ai_service`]: OpenAI-compatible chat completions, streamed
//! - [`error_handler`]: unified [`AiLlmError`]
//! - [`telemetry`]: tracing subscriber setup for the service

pub mod config;
pub mod error_handler;
pub mod services;
pub mod telemetry;

pub use config::{default_config::config_openai_chat, llm_model_config::LlmModelConfig};
pub use error_handler::{AiLlmError, ConfigError, HttpError, ProviderError};
pub use services::open_ai_service::{CompletionStream, OpenAiService};
