use ingest::{ParsedRecord, Pmid};
use serde::{Deserialize, Serialize};

/// `Trait_Type` carried by every dictionary span.
pub const DICTIONARY_TRAIT_TYPE: &str = "dict_Trait";

/// One located trait mention. Offsets are half-open character offsets into
/// the lower-cased field text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    #[serde(rename = "Trait_Type")]
    pub trait_type: String,
    #[serde(rename = "Starting_Index")]
    pub start: usize,
    #[serde(rename = "Ending_Index")]
    pub end: usize,
    #[serde(rename = "Word")]
    pub word: String,
}

impl MatchSpan {
    pub fn new(trait_type: impl Into<String>, start: usize, word: String) -> Self {
        let end = start + word.chars().count();
        Self {
            trait_type: trait_type.into(),
            start,
            end,
            word,
        }
    }

    #[cfg(test)]
    pub fn is_dictionary(&self) -> bool {
        self.trait_type == DICTIONARY_TRAIT_TYPE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Abstract,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Title => f.write_str("title"),
            Field::Abstract => f.write_str("abstract"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    #[serde(rename = "PMID")]
    pub pmid: Pmid,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Abstract")]
    pub abstract_text: String,
    #[serde(rename = "Title_Traits")]
    pub title_traits: Vec<MatchSpan>,
    #[serde(rename = "Abstract_Traits")]
    pub abstract_traits: Vec<MatchSpan>,
}

impl AnnotatedRecord {
    pub fn new(
        record: ParsedRecord,
        title_traits: Vec<MatchSpan>,
        abstract_traits: Vec<MatchSpan>,
    ) -> Self {
        Self {
            pmid: record.pmid,
            title: record.title,
            abstract_text: record.abstract_text,
            title_traits,
            abstract_traits,
        }
    }

    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Abstract => &self.abstract_text,
        }
    }

    pub fn traits(&self, field: Field) -> &[MatchSpan] {
        match field {
            Field::Title => &self.title_traits,
            Field::Abstract => &self.abstract_traits,
        }
    }

    /// Model spans always go after the dictionary spans already present.
    pub fn append_model_spans(&mut self, field: Field, spans: Vec<MatchSpan>) {
        match field {
            Field::Title => self.title_traits.extend(spans),
            Field::Abstract => self.abstract_traits.extend(spans),
        }
    }
}
