//! Runtime configuration loaded from environment variables.

use std::{path::PathBuf, str::FromStr};

use crate::{
    error::PipelineError,
    splitter::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_SEPARATOR},
};

/// Config bag for the pipeline. All fields have defaults via `from_env`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    // Splitter knobs
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub separator: String,

    /// JSON corpus file; the embedded dataset is used when unset.
    pub reviews_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separator: DEFAULT_SEPARATOR.to_string(),
            reviews_path: None,
        }
    }
}

impl PipelineConfig {
    /// Reads `CHUNK_SIZE`, `CHUNK_OVERLAP`, `CHUNK_SEPARATOR` and `REVIEWS_PATH`.
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary lookup.
    ///
    /// `CHUNK_SEPARATOR` understands `\n`, `\t` and `\\` escapes so it can be
    /// written on one line in a `.env` file.
    ///
    /// # Errors
    /// [`PipelineError::InvalidConfig`] when a number does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dflt = Self::default();
        Ok(Self {
            chunk_size: parse(&lookup, "CHUNK_SIZE", dflt.chunk_size)?,
            chunk_overlap: parse(&lookup, "CHUNK_OVERLAP", dflt.chunk_overlap)?,
            separator: lookup("CHUNK_SEPARATOR")
                .map(|s| unescape(&s))
                .unwrap_or(dflt.separator),
            reviews_path: lookup("REVIEWS_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse<F, T>(lookup: &F, k: &'static str, dflt: T) -> Result<T, PipelineError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(k).filter(|v| !v.trim().is_empty()) {
        Some(v) => v.trim().parse().map_err(|_| PipelineError::InvalidConfig {
            var: k,
            reason: format!("`{v}` is not a valid number"),
        }),
        None => Ok(dflt),
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        let cfg = PipelineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, PipelineConfig::default());
        assert_eq!(cfg.separator, "\n\n");
    }

    #[test]
    fn overrides_and_escapes() {
        let cfg = PipelineConfig::from_lookup(|k: &str| match k {
            "CHUNK_SIZE" => Some("400".into()),
            "CHUNK_OVERLAP" => Some("0".into()),
            "CHUNK_SEPARATOR" => Some(r"},\n".into()),
            "REVIEWS_PATH" => Some("/data/reviews.json".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.chunk_size, 400);
        assert_eq!(cfg.chunk_overlap, 0);
        assert_eq!(cfg.separator, "},\n");
        assert_eq!(cfg.reviews_path, Some(PathBuf::from("/data/reviews.json")));
    }

    #[test]
    fn bad_number_is_reported() {
        let err = PipelineConfig::from_lookup(|k: &str| {
            (k == "CHUNK_SIZE").then(|| "big".to_string())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidConfig {
                var: "CHUNK_SIZE",
                ..
            }
        ));
    }
}
