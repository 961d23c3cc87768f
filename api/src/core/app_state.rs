use std::sync::Arc;

use ai_llm_service::{OpenAiService, config_openai_chat};
use query_pipeline::{PipelineConfig, QueryPipeline};
use tracing::info;

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// Corpus, splitter, template and completion client, built once at startup.
    pub pipeline: Arc<QueryPipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<QueryPipeline>) -> Self {
        Self { pipeline }
    }

    /// Load shared state from environment variables.
    ///
    /// Fails when the OpenAI settings or the corpus are unusable, so the
    /// server never starts accepting requests it cannot answer.
    pub fn from_env() -> Result<Self, AppError> {
        let llm_cfg = config_openai_chat()?;
        info!(
            model = %llm_cfg.model,
            endpoint = %llm_cfg.endpoint,
            stream = llm_cfg.stream,
            "completion provider configured"
        );
        let llm = Arc::new(OpenAiService::new(llm_cfg)?);

        let pipeline_cfg = PipelineConfig::from_env()?;
        let pipeline = QueryPipeline::from_config(&pipeline_cfg, llm)?;

        Ok(Self::new(Arc::new(pipeline)))
    }
}
