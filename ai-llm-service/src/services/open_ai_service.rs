//! OpenAI (ChatGPT) service for chat completions.
//!
//! Endpoints are derived from `LlmModelConfig::endpoint`:
//! - POST {endpoint}/v1/chat/completions — streaming or single-shot completion
//!
//! Constructor validation:
//! - `cfg.api_key` must be present
//! - `cfg.endpoint` must start with http:// or https://
//!
//! Errors are normalized via unified error types in `error_handler`.

use std::{
    collections::VecDeque,
    pin::Pin,
    time::{Duration, Instant},
};

use futures::{Stream, StreamExt, stream};
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{AiLlmError, HttpError, ProviderError, make_snippet},
    services::sse::{SseDecoder, SseEvent},
};

/// Ordered, forward-only sequence of completion fragments.
///
/// Dropping the stream drops the underlying HTTP response, which closes the
/// upstream connection.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String, AiLlmError>> + Send>>;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_STREAM_IDLE: Duration = Duration::from_secs(30);

/// Thin client for the OpenAI chat completions API.
///
/// Constructed from a complete [`LlmModelConfig`]. Internally keeps a
/// preconfigured `reqwest::Client` (with timeouts and default headers) that
/// is shared by every request.
///
/// High-level operations:
/// - [`OpenAiService::stream_chat`] — completion as a [`CompletionStream`]
/// - [`OpenAiService::generate`]    — single, non-streaming completion
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - [`ProviderError::MissingApiKey`] if `cfg.api_key` is `None` or blank
    /// - [`ProviderError::InvalidEndpoint`] if `cfg.endpoint` is invalid
    /// - [`ProviderError::InvalidApiKey`] if the key cannot be sent as a header
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        // 1) API key must be present.
        let api_key = cfg
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ProviderError::MissingApiKey)?;

        // 2) Endpoint must use http/https.
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ProviderError::InvalidEndpoint(cfg.endpoint.clone()).into());
        }

        // 3) HTTP client: timeouts + default headers.
        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|e| ProviderError::InvalidApiKey(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_chat = format!("{}/v1/chat/completions", base);

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            stream = cfg.stream,
            timeout_secs = timeout.as_secs(),
            "OpenAiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
        })
    }

    /// Sends `prompt` as a single user message and returns the completion as
    /// a stream of text fragments, in the order the provider emits them.
    ///
    /// The upstream status is checked before this returns, so a rejected
    /// request never yields a stream. When the config disables streaming the
    /// full completion is fetched with [`generate`](Self::generate) and
    /// yielded as one fragment.
    ///
    /// # Errors
    /// - [`ProviderError::HttpStatus`] for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    ///
    /// Items of the stream may fail with [`AiLlmError::Timeout`] (idle
    /// timeout), [`ProviderError::Upstream`], [`ProviderError::Decode`] or a
    /// transport error; the stream ends after the first error.
    pub async fn stream_chat(&self, prompt: &str) -> Result<CompletionStream, AiLlmError> {
        if !self.cfg.stream {
            let text = self.generate(prompt).await?;
            return Ok(Box::pin(stream::once(async move { Ok(text) })));
        }

        let started = Instant::now();
        let body = ChatCompletionRequest::from_cfg(&self.cfg, prompt, true);

        debug!(
            model = %self.cfg.model,
            endpoint = %self.cfg.endpoint,
            prompt_len = prompt.len(),
            "POST {} (stream)", self.url_chat
        );

        let resp = self.client.post(&self.url_chat).json(&body).send().await?;
        let resp = self.ensure_success(resp, started).await?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            "chat completion stream opened"
        );

        let idle = self
            .cfg
            .stream_idle_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_STREAM_IDLE);

        Ok(fragment_stream(
            Box::pin(resp.bytes_stream()),
            idle,
            self.cfg.model.clone(),
            started,
        ))
    }

    /// Performs a **non-streaming** chat completion request (`/v1/chat/completions`).
    ///
    /// Mapped options from config: `model`, `temperature`, `top_p`, `max_tokens`.
    ///
    /// # Errors
    /// - [`ProviderError::HttpStatus`] for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    /// - [`ProviderError::Decode`] if the JSON cannot be parsed
    /// - [`ProviderError::EmptyChoices`] if no choices are returned
    pub async fn generate(&self, prompt: &str) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let body = ChatCompletionRequest::from_cfg(&self.cfg, prompt, false);

        debug!(
            model = %self.cfg.model,
            endpoint = %self.cfg.endpoint,
            prompt_len = prompt.len(),
            "POST {}", self.url_chat
        );

        let resp = self.client.post(&self.url_chat).json(&body).send().await?;
        let resp = self.ensure_success(resp, started).await?;

        let out: ChatCompletionResponse = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                error!(
                    error = %e,
                    model = %self.cfg.model,
                    latency_ms = started.elapsed().as_millis(),
                    "failed to decode /v1/chat/completions response"
                );
                return Err(ProviderError::Decode(format!(
                    "serde error: {e}; expected `choices[0].message.content`"
                ))
                .into());
            }
        };

        let content = out
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .ok_or(ProviderError::EmptyChoices)?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            "chat completion completed"
        );

        Ok(content)
    }

    async fn ensure_success(
        &self,
        resp: reqwest::Response,
        started: Instant,
    ) -> Result<reqwest::Response, AiLlmError> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let url = self.url_chat.clone();
        let text = resp.text().await.unwrap_or_default();
        let snippet = make_snippet(&text);

        error!(
            %status,
            %url,
            %snippet,
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            "OpenAI /v1/chat/completions returned non-success status"
        );

        Err(ProviderError::HttpStatus(HttpError {
            status,
            url,
            snippet,
        })
        .into())
    }
}

/* ===========================================================================
Streaming
======================================================================== */

struct FragmentState<S> {
    body: S,
    decoder: SseDecoder,
    pending: VecDeque<Result<String, AiLlmError>>,
    finished: bool,
    idle: Duration,
    fragments: usize,
    model: String,
    started: Instant,
}

impl<S> FragmentState<S> {
    fn absorb(&mut self, decoded: Result<Vec<SseEvent>, ProviderError>) {
        let events = match decoded {
            Ok(events) => events,
            Err(e) => {
                self.fail(e.into());
                return;
            }
        };
        for ev in events {
            if self.finished {
                break;
            }
            match ev {
                SseEvent::Delta(text) => self.pending.push_back(Ok(text)),
                SseEvent::Done => self.finished = true,
                SseEvent::Error(message) => self.fail(ProviderError::Upstream(message).into()),
            }
        }
    }

    fn fail(&mut self, err: AiLlmError) {
        self.pending.push_back(Err(err));
        self.finished = true;
    }
}

/// Turns a raw SSE byte stream into completion fragments.
///
/// Each wait for the next network chunk is bounded by `idle`.
pub(crate) fn fragment_stream<S, B, E>(
    body: S,
    idle: Duration,
    model: String,
    started: Instant,
) -> CompletionStream
where
    S: Stream<Item = Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<AiLlmError> + Send + 'static,
{
    let state = FragmentState {
        body,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
        idle,
        fragments: 0,
        model,
        started,
    };

    Box::pin(stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.pending.pop_front() {
                match &item {
                    Ok(_) => st.fragments += 1,
                    Err(e) => warn!(
                        error = %e,
                        model = %st.model,
                        fragments = st.fragments,
                        "chat completion stream failed"
                    ),
                }
                return Some((item, st));
            }

            if st.finished {
                info!(
                    model = %st.model,
                    fragments = st.fragments,
                    latency_ms = st.started.elapsed().as_millis(),
                    "chat completion stream finished"
                );
                return None;
            }

            match tokio::time::timeout(st.idle, st.body.next()).await {
                Err(_) => {
                    let idle = st.idle;
                    st.fail(AiLlmError::Timeout(idle));
                }
                Ok(Some(Ok(bytes))) => {
                    let decoded = st.decoder.push(bytes.as_ref());
                    st.absorb(decoded);
                }
                Ok(Some(Err(e))) => st.fail(e.into()),
                Ok(None) => {
                    // Connection closed without `[DONE]`: keep what was sent.
                    let decoded = st.decoder.finish();
                    st.absorb(decoded);
                    if !st.finished && !st.decoder.saw_data() {
                        st.fail(
                            ProviderError::Decode(
                                "response body carried no `data:` events".into(),
                            )
                            .into(),
                        );
                    }
                    st.finished = true;
                }
            }
        }
    }))
}

/* ===========================================================================
HTTP payloads & options
======================================================================== */

/// Request body for `/v1/chat/completions`.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

impl<'a> ChatCompletionRequest<'a> {
    /// Builds a chat request from config with `prompt` as the only user message.
    fn from_cfg(cfg: &'a LlmModelConfig, prompt: &'a str, stream: bool) -> Self {
        Self {
            model: &cfg.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            max_tokens: cfg.max_tokens,
            stream,
        }
    }
}

/// Chat message for the OpenAI API.
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    /// One of: "system" | "user" | "assistant" | ...
    role: &'a str,
    content: &'a str,
}

/// Minimal response for `/v1/chat/completions`.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}
