//! Professor review corpus.
//!
//! Owns the typed review model ([`ReviewRecord`], [`Review`]), the dataset
//! shipped with the service, and the [`CorpusSource`] seam the query
//! pipeline reads from. The serialized form produced by [`serialize_corpus`]
//! is the text the pipeline splits into context chunks.

pub mod errors;
pub mod record;
pub mod source;

pub use errors::CorpusError;
pub use record::{Corpus, Review, ReviewRecord, serialize_corpus};
pub use source::{CorpusSource, StaticCorpus};
