use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum VocabularyError {
    #[error("vocabulary file {path:?} was not found")]
    NotFound { path: PathBuf },

    #[error("failed to read vocabulary file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Lower-cased trait terms, de-duplicated, in first-seen order.
/// Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
}

impl Vocabulary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Blank and whitespace-only entries are skipped.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().to_lowercase())
            .filter(|t| !t.trim().is_empty())
            .filter(|t| seen.insert(t.clone()))
            .collect();

        Self { terms }
    }

    /// One term per line; only the line terminator is stripped.
    pub fn parse(contents: &str) -> Self {
        Self::from_terms(contents.lines())
    }

    pub fn load(path: &Path) -> Result<Self, VocabularyError> {
        let contents = std::fs::read_to_string(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => VocabularyError::NotFound {
                path: path.to_path_buf(),
            },
            _ => VocabularyError::Read {
                path: path.to_path_buf(),
                source: err,
            },
        })?;

        Ok(Self::parse(&contents))
    }

    /// Matching still works without a dictionary, so a load failure only
    /// leaves the vocabulary empty.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(vocabulary) => {
                tracing::info!(path = %path.display(), terms = vocabulary.len(), "Loaded trait vocabulary");
                vocabulary
            }
            Err(e) => {
                tracing::warn!(error = %e, "Trait vocabulary unavailable, dictionary matching disabled");
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    #[cfg(test)]
    pub fn contains(&self, term: &str) -> bool {
        self.terms.iter().any(|t| t == term)
    }
}
