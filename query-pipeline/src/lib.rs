//! Question answering over the professor review corpus.
//!
//! Public API: [`QueryPipeline`]. For each request it serializes and splits
//! the corpus (context), flattens the earlier turns (history), fills the
//! prompt template, and streams the model's answer back as text fragments.
//! There is no vector search: the context is the whole corpus, split by a
//! plain character splitter.

mod cfg;
mod conversation;
mod error;
mod history;
mod pipeline;
mod prompt;
mod splitter;

pub use cfg::PipelineConfig;
pub use conversation::{ConversationTurn, Role};
pub use error::PipelineError;
pub use history::{format_history, format_turn};
pub use pipeline::QueryPipeline;
pub use prompt::{DEFAULT_TEMPLATE, PromptContext, PromptTemplate};
pub use splitter::{CharacterTextSplitter, TextChunk, join_chunks};
