//! Character text splitter.
//!
//! Splits on a fixed separator, then greedily merges the pieces back into
//! chunks of at most `chunk_size` characters, carrying up to `chunk_overlap`
//! characters of trailing pieces into the next chunk. It knows nothing about
//! the structure of the text, so one review record may straddle two chunks.

use std::collections::VecDeque;

use tracing::debug;

use crate::error::PipelineError;

pub const DEFAULT_SEPARATOR: &str = "\n\n";
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Separator placed between chunks when they are handed to the prompt.
pub const CHUNK_JOINER: &str = "\n\n";

/// A piece of the serialized corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk(String);

impl TextChunk {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Joins chunks into the single context string used by the prompt.
pub fn join_chunks(chunks: &[TextChunk]) -> String {
    chunks
        .iter()
        .map(TextChunk::as_str)
        .collect::<Vec<_>>()
        .join(CHUNK_JOINER)
}

#[derive(Debug, Clone)]
pub struct CharacterTextSplitter {
    separator: String,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for CharacterTextSplitter {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl CharacterTextSplitter {
    /// # Errors
    /// [`PipelineError::InvalidConfig`] when `chunk_size` is zero or
    /// `chunk_overlap` is not smaller than `chunk_size`.
    pub fn new(
        separator: impl Into<String>,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<Self, PipelineError> {
        if chunk_size == 0 {
            return Err(PipelineError::InvalidConfig {
                var: "CHUNK_SIZE",
                reason: "must be greater than zero".into(),
            });
        }
        if chunk_overlap >= chunk_size {
            return Err(PipelineError::InvalidConfig {
                var: "CHUNK_OVERLAP",
                reason: format!("{chunk_overlap} must be smaller than chunk size {chunk_size}"),
            });
        }
        Ok(Self {
            separator: separator.into(),
            chunk_size,
            chunk_overlap,
        })
    }

    /// Separator the text is split on.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Splits `text` into ordered chunks. Empty pieces are dropped.
    pub fn split_text(&self, text: &str) -> Vec<TextChunk> {
        let pieces: Vec<&str> = if self.separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(self.separator.as_str())
                .filter(|p| !p.is_empty())
                .collect()
        };
        self.merge(&pieces)
    }

    fn merge(&self, pieces: &[&str]) -> Vec<TextChunk> {
        let sep_len = self.separator.chars().count();
        let sep_if = |non_empty: bool| if non_empty { sep_len } else { 0 };

        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = piece.chars().count();

            if total + len + sep_if(!window.is_empty()) > self.chunk_size && !window.is_empty() {
                chunks.push(self.emit(&window, total));

                // Keep at most `chunk_overlap` characters, and make room for `piece`.
                while total > self.chunk_overlap
                    || (total > 0 && total + len + sep_if(!window.is_empty()) > self.chunk_size)
                {
                    let Some((_, first_len)) = window.pop_front() else {
                        break;
                    };
                    total = total.saturating_sub(first_len + sep_if(!window.is_empty()));
                }
            }

            total += len + sep_if(!window.is_empty());
            window.push_back((piece, len));
        }

        if !window.is_empty() {
            chunks.push(self.emit(&window, total));
        }
        chunks
    }

    fn emit(&self, window: &VecDeque<(&str, usize)>, total: usize) -> TextChunk {
        if total > self.chunk_size {
            debug!(
                chunk_len = total,
                chunk_size = self.chunk_size,
                "chunk exceeds configured size (single piece without separator)"
            );
        }
        let text = window
            .iter()
            .map(|(p, _)| *p)
            .collect::<Vec<_>>()
            .join(&self.separator);
        TextChunk(text)
    }
}
