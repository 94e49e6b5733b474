use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// PubMed record identifier. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pmid(u64);

impl Pmid {
    pub fn new(value: u64) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Pmid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("PMID must be a positive integer, got {0:?}")]
pub struct InvalidPmid(pub String);

impl FromStr for Pmid {
    type Err = InvalidPmid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidPmid(s.to_string()));
        }
        s.parse::<u64>()
            .ok()
            .and_then(Pmid::new)
            .ok_or_else(|| InvalidPmid(s.to_string()))
    }
}

/// Unparsed efetch body for one identifier.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub pmid: Pmid,
    pub body: String,
}

impl RawRecord {
    pub fn new(pmid: Pmid, body: impl Into<String>) -> Self {
        Self {
            pmid,
            body: body.into(),
        }
    }
}

/// Title and abstract extracted from a [`RawRecord`], newline-free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub pmid: Pmid,
    pub title: String,
    pub abstract_text: String,
}
