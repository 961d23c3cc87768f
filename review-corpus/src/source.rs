//! Corpus sources.
//!
//! The pipeline only sees [`CorpusSource`]; the dataset behind it can be the
//! one compiled into the binary or a JSON file chosen at startup.

use std::path::Path;

use tracing::info;

use crate::{
    errors::CorpusError,
    record::{Corpus, ReviewRecord},
};

/// Dataset compiled into the binary.
const EMBEDDED_PROFESSORS: &str = include_str!("../data/professors.json");

/// Anything that can hand out the current set of review records.
pub trait CorpusSource: Send + Sync {
    fn load_corpus(&self) -> Result<Vec<ReviewRecord>, CorpusError>;
}

/// Corpus parsed once and held in memory.
#[derive(Debug, Clone)]
pub struct StaticCorpus {
    records: Vec<ReviewRecord>,
}

impl StaticCorpus {
    pub fn new(records: Vec<ReviewRecord>) -> Self {
        Self { records }
    }

    /// The dataset shipped with the service.
    pub fn embedded() -> Result<Self, CorpusError> {
        Self::from_json_str(EMBEDDED_PROFESSORS)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CorpusError> {
        let corpus = Corpus::from_json_str(raw)?;
        Ok(Self::new(corpus.professors))
    }

    /// Reads a `{ "professors": [...] }` file once.
    ///
    /// # Errors
    /// [`CorpusError::Io`] if the file cannot be read, [`CorpusError::Json`]
    /// if it does not parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let corpus = Self::from_json_str(&raw)?;

        info!(
            path = %path.display(),
            records = corpus.records.len(),
            "review corpus loaded from file"
        );

        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CorpusSource for StaticCorpus {
    fn load_corpus(&self) -> Result<Vec<ReviewRecord>, CorpusError> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::serialize_corpus;

    #[test]
    fn embedded_dataset_parses() {
        let corpus = StaticCorpus::embedded().unwrap();
        assert_eq!(corpus.len(), 25);

        let records = corpus.load_corpus().unwrap();
        let lee = records.iter().find(|r| r.id == 1).unwrap();
        assert_eq!(lee.name, "Dr. Samantha Lee");
        assert_eq!(lee.overall_rating, 4.2);
        assert_eq!(lee.reviews.len(), 1);
    }

    #[test]
    fn embedded_blob_mentions_known_professor() {
        let records = StaticCorpus::embedded().unwrap().load_corpus().unwrap();
        let blob = serialize_corpus(&records).unwrap();
        assert!(blob.starts_with(r#"{"professors":[{"id":1,"name":"Dr. Samantha Lee""#));
        assert!(blob.contains(r#""overallRating":4.2"#));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = StaticCorpus::from_path("/definitely/not/here.json").unwrap_err();
        match err {
            CorpusError::Io { path, .. } => {
                assert!(path.ends_with("here.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
