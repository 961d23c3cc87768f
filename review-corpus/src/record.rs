use serde::{Deserialize, Serialize};

use crate::errors::CorpusError;

/// A single student review of a professor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// ISO date string, e.g. `2024-03-15`.
    pub date: String,
    pub course: String,
    pub rating: u8,
    pub difficulty: u8,
    pub comment: String,
}

/// A professor with aggregate ratings and the reviews behind them.
///
/// Field order mirrors the dataset; serialization keeps it, so the context
/// blob reads the same as the source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: u32,
    pub name: String,
    pub department: String,
    pub institution: String,
    pub overall_rating: f64,
    pub would_take_again_percent: u32,
    pub level_of_difficulty: f64,
    pub reviews: Vec<Review>,
}

/// On-disk and serialized envelope: `{ "professors": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    pub professors: Vec<ReviewRecord>,
}

impl Corpus {
    /// Parses a corpus from its JSON envelope.
    pub fn from_json_str(raw: &str) -> Result<Self, CorpusError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Serializes records into the compact JSON blob used as retrieval context.
///
/// # Example
/// ```
/// use review_corpus::serialize_corpus;
/// let blob = serialize_corpus(&[]).unwrap();
/// assert_eq!(blob, r#"{"professors":[]}"#);
/// ```
pub fn serialize_corpus(records: &[ReviewRecord]) -> Result<String, CorpusError> {
    #[derive(Serialize)]
    struct Envelope<'a> {
        professors: &'a [ReviewRecord],
    }

    Ok(serde_json::to_string(&Envelope {
        professors: records,
    })?)
}
