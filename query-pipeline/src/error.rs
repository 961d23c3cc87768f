//! Typed error for the query-pipeline crate.

use ai_llm_service::AiLlmError;
use review_corpus::CorpusError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The caller sent a conversation the pipeline cannot use.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A pipeline setting is missing or out of range.
    #[error("invalid configuration in {var}: {reason}")]
    InvalidConfig { var: &'static str, reason: String },

    /// The prompt template is missing a placeholder.
    #[error("invalid prompt template: {0}")]
    InvalidTemplate(String),

    /// Errors from the review corpus.
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    /// Errors from the completion client.
    #[error(transparent)]
    Llm(#[from] AiLlmError),
}
