// Shared helpers for the integration tests.
#![allow(dead_code)]

pub mod mock_openai;

use std::sync::Arc;

use ai_llm_service::{LlmModelConfig, OpenAiService};
use api::{AppState, router};
use axum::Router;
use query_pipeline::{PipelineConfig, QueryPipeline};

/// The API router wired to a completion provider at `endpoint`.
pub fn app_against(endpoint: &str) -> Router {
    let llm = OpenAiService::new(LlmModelConfig {
        model: "gpt-test".into(),
        endpoint: endpoint.into(),
        api_key: Some("sk-test".into()),
        max_tokens: None,
        temperature: Some(0.2),
        top_p: None,
        stream: true,
        timeout_secs: Some(5),
        stream_idle_secs: Some(5),
    })
    .unwrap();
    let pipeline = QueryPipeline::from_config(&PipelineConfig::default(), Arc::new(llm)).unwrap();
    router(Arc::new(AppState::new(Arc::new(pipeline))))
}
