//! The question pipeline: context → history → prompt → streamed completion.

use std::sync::Arc;

use ai_llm_service::{CompletionStream, OpenAiService};
use review_corpus::{CorpusSource, StaticCorpus, serialize_corpus};
use tracing::{debug, info};

use crate::{
    cfg::PipelineConfig,
    conversation::ConversationTurn,
    error::PipelineError,
    history::format_history,
    prompt::{PromptContext, PromptTemplate},
    splitter::{CharacterTextSplitter, TextChunk, join_chunks},
};

/// Holds the four stages. Everything inside is read-only, so one instance
/// (behind an `Arc`) serves all requests.
pub struct QueryPipeline {
    corpus: Arc<dyn CorpusSource>,
    splitter: CharacterTextSplitter,
    template: PromptTemplate,
    llm: Arc<OpenAiService>,
}

impl QueryPipeline {
    pub fn new(
        corpus: Arc<dyn CorpusSource>,
        splitter: CharacterTextSplitter,
        template: PromptTemplate,
        llm: Arc<OpenAiService>,
    ) -> Self {
        Self {
            corpus,
            splitter,
            template,
            llm,
        }
    }

    /// Builds the pipeline from config: file-backed corpus when
    /// `reviews_path` is set, the embedded dataset otherwise.
    ///
    /// # Errors
    /// [`PipelineError::InvalidConfig`] for bad splitter sizes,
    /// [`PipelineError::Corpus`] when the dataset cannot be loaded.
    pub fn from_config(cfg: &PipelineConfig, llm: Arc<OpenAiService>) -> Result<Self, PipelineError> {
        let splitter =
            CharacterTextSplitter::new(cfg.separator.clone(), cfg.chunk_size, cfg.chunk_overlap)?;

        let corpus = match &cfg.reviews_path {
            Some(path) => StaticCorpus::from_path(path)?,
            None => StaticCorpus::embedded()?,
        };

        info!(
            records = corpus.len(),
            chunk_size = splitter.chunk_size(),
            chunk_overlap = splitter.chunk_overlap(),
            separator = ?splitter.separator(),
            "query pipeline ready"
        );

        Ok(Self::new(
            Arc::new(corpus),
            splitter,
            PromptTemplate::default(),
            llm,
        ))
    }

    /// Stage 1: serialize the corpus and split it.
    pub fn context_chunks(&self) -> Result<Vec<TextChunk>, PipelineError> {
        let records = self.corpus.load_corpus()?;
        let blob = serialize_corpus(&records)?;
        Ok(self.splitter.split_text(&blob))
    }

    /// Stages 1–3: the final prompt for `messages`.
    ///
    /// The last turn is the question; all earlier turns become history.
    ///
    /// # Errors
    /// [`PipelineError::MalformedInput`] for an empty conversation.
    pub fn build_prompt(&self, messages: &[ConversationTurn]) -> Result<String, PipelineError> {
        let Some((current, previous)) = messages.split_last() else {
            return Err(PipelineError::MalformedInput(
                "`messages` must contain at least one entry".into(),
            ));
        };

        let chat_history = format_history(previous);
        let chunks = self.context_chunks()?;

        debug!(
            turns = messages.len(),
            chunks = chunks.len(),
            "assembling prompt"
        );

        let ctx = PromptContext {
            context: join_chunks(&chunks),
            chat_history,
            question: current.content.clone(),
        };
        Ok(self.template.render(&ctx))
    }

    /// Runs all four stages and returns the completion fragments.
    ///
    /// Validation and prompt assembly happen before any network call, so a
    /// malformed conversation never reaches the provider.
    pub async fn stream(
        &self,
        messages: &[ConversationTurn],
    ) -> Result<CompletionStream, PipelineError> {
        let prompt = self.build_prompt(messages)?;
        Ok(self.llm.stream_chat(&prompt).await?)
    }
}

#[cfg(test)]
mod tests {
    use ai_llm_service::LlmModelConfig;
    use review_corpus::{Review, ReviewRecord};

    use super::*;

    fn llm() -> Arc<OpenAiService> {
        Arc::new(
            OpenAiService::new(LlmModelConfig {
                model: "gpt-test".into(),
                endpoint: "http://127.0.0.1:9".into(),
                api_key: Some("sk-test".into()),
                max_tokens: None,
                temperature: Some(0.2),
                top_p: None,
                stream: true,
                timeout_secs: Some(1),
                stream_idle_secs: Some(1),
            })
            .unwrap(),
        )
    }

    fn pipeline() -> QueryPipeline {
        QueryPipeline::from_config(&PipelineConfig::default(), llm()).unwrap()
    }

    #[test]
    fn prompt_embeds_the_corpus() {
        let p = pipeline();
        let prompt = p
            .build_prompt(&[ConversationTurn::user("What is Dr. Lee's overall rating?")])
            .unwrap();

        let ctx_start = prompt.find("Context: ").unwrap();
        let ctx_end = prompt.find("Current conversation:").unwrap();
        let context = &prompt[ctx_start..ctx_end];
        assert!(context.contains("Samantha Lee"));
        assert!(context.contains("4.2"));
        assert!(prompt.contains("user: What is Dr. Lee's overall rating?\nassistant:"));
    }

    #[test]
    fn history_excludes_the_current_question() {
        let p = pipeline();
        let prompt = p
            .build_prompt(&[
                ConversationTurn::user("Who teaches BIO 201?"),
                ConversationTurn::assistant("Dr. Samantha Lee."),
                ConversationTurn::user("Is she hard?"),
            ])
            .unwrap();
        assert!(prompt.contains(
            "Current conversation: user: Who teaches BIO 201?\nassistant: Dr. Samantha Lee.\n\nuser: Is she hard?"
        ));
    }

    #[test]
    fn empty_conversation_is_malformed() {
        let err = pipeline().build_prompt(&[]).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedInput(_)));
    }

    #[tokio::test]
    async fn empty_conversation_never_reaches_upstream() {
        // The endpoint is unroutable; reaching it would yield a transport error.
        match pipeline().stream(&[]).await {
            Err(PipelineError::MalformedInput(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn context_chunks_rejoin_to_the_serialized_corpus() {
        let records: Vec<ReviewRecord> = (1..=6)
            .map(|id| ReviewRecord {
                id,
                name: format!("Prof. {id}"),
                department: "Math".into(),
                institution: "U".into(),
                overall_rating: 4.0,
                would_take_again_percent: 80,
                level_of_difficulty: 3.5,
                reviews: vec![Review {
                    date: "2024-01-01".into(),
                    course: format!("MATH {id}"),
                    rating: 4,
                    difficulty: 3,
                    comment: "Clear lectures.".into(),
                }],
            })
            .collect();
        let blob = serialize_corpus(&records).unwrap();

        let p = QueryPipeline::new(
            Arc::new(StaticCorpus::new(records)),
            CharacterTextSplitter::new(",", 120, 0).unwrap(),
            PromptTemplate::default(),
            llm(),
        );
        let chunks = p.context_chunks().unwrap();
        assert!(chunks.len() > 1);

        let rejoined = chunks
            .into_iter()
            .map(TextChunk::into_string)
            .collect::<Vec<_>>()
            .join(",");
        assert_eq!(rejoined, blob);
    }

    #[test]
    fn default_split_keeps_embedded_corpus_in_one_chunk() {
        let p = pipeline();
        let chunks = p.context_chunks().unwrap();
        let blob = serialize_corpus(&StaticCorpus::embedded().unwrap().load_corpus().unwrap())
            .unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].as_str(), blob);
    }
}
