/// Configuration for a chat completion model.
///
/// # Fields
///
/// - `model`: The model identifier (e.g., `"gpt-3.5-turbo"`).
/// - `endpoint`: API base URL without the `/v1/...` suffix.
/// - `api_key`: Bearer token. Required by [`OpenAiService::new`].
/// - `max_tokens`: Maximum number of tokens to generate (if supported).
/// - `temperature`: Controls randomness (0.0 = deterministic, >1.0 = more random).
/// - `top_p`: Nucleus sampling cutoff (alternative to temperature).
/// - `stream`: Ask the provider for incremental output.
/// - `timeout_secs`: Total request timeout in seconds.
/// - `stream_idle_secs`: Longest wait between two streamed fragments.
///
/// # Examples
///
/// ```
/// use ai_llm_service::LlmModelConfig;
///
/// let cfg = LlmModelConfig {
///     model: "gpt-3.5-turbo".to_string(),
///     endpoint: "https://api.openai.com".to_string(),
///     api_key: Some("sk-...".to_string()),
///     max_tokens: None,
///     temperature: Some(0.2),
///     top_p: None,
///     stream: true,
///     timeout_secs: Some(120),
///     stream_idle_secs: Some(30),
/// };
/// assert!(cfg.stream);
/// ```
///
/// [`OpenAiService::new`]: crate::services::open_ai_service::OpenAiService::new
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// Model identifier string (e.g., `"gpt-3.5-turbo"`).
    pub model: String,

    /// API base URL (e.g., `https://api.openai.com`).
    pub endpoint: String,

    /// API key for bearer authentication.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature (controls creativity).
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Request incremental (token-by-token) output.
    pub stream: bool,

    /// Optional total request timeout (in seconds).
    pub timeout_secs: Option<u64>,

    /// Optional idle timeout between streamed fragments (in seconds).
    pub stream_idle_secs: Option<u64>,
}
