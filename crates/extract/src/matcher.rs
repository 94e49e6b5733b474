use std::sync::Arc;

use crate::schema::{DICTIONARY_TRAIT_TYPE, MatchSpan};
use crate::vocabulary::Vocabulary;

/// Scans text fields against a shared vocabulary.
#[derive(Debug, Clone)]
pub struct DictionaryMatcher {
    vocabulary: Arc<Vocabulary>,
}

impl DictionaryMatcher {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn find(&self, text: &str) -> Vec<MatchSpan> {
        match_terms(text, &self.vocabulary)
    }
}

/// Finds every occurrence of every term that is not glued to an ASCII
/// letter or digit on either side.
///
/// Spans come out grouped by term (vocabulary order), then by position
/// within that term. Overlaps between terms are all kept. Sort by `start`
/// if text order is needed.
pub fn match_terms(text: &str, vocabulary: &Vocabulary) -> Vec<MatchSpan> {
    let lowered = text.to_lowercase();
    let mut spans = Vec::new();

    for term in vocabulary.iter().filter(|t| !t.is_empty()) {
        let mut from = 0;
        while let Some(pos) = lowered[from..].find(term) {
            let start = from + pos;
            let end = start + term.len();

            if is_bounded(&lowered, start, end) {
                spans.push(MatchSpan::new(
                    DICTIONARY_TRAIT_TYPE,
                    char_offset(&lowered, start),
                    term.to_string(),
                ));
                from = end;
            } else {
                // A rejected candidate can still overlap a valid one.
                from = start + lowered[start..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    spans
}

fn is_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();

    !before.is_some_and(|c| c.is_ascii_alphanumeric())
        && !after.is_some_and(|c| c.is_ascii_alphanumeric())
}

pub(crate) fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}
