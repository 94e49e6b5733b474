use std::time::Duration;

/// Which of the two Entrez round trips failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStep {
    Search,
    Fetch,
}

impl std::fmt::Display for FetchStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStep::Search => f.write_str("esearch"),
            FetchStep::Fetch => f.write_str("efetch"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport failure, non-2xx status or undecodable body.
    #[error("{step} request failed: {source}")]
    Network {
        step: FetchStep,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("record exchange timed out after {after:?}")]
    Timeout { after: Duration },

    /// The search response did not carry a usable session.
    #[error("esearch response is missing {marker}")]
    Protocol { marker: &'static str },
}

impl FetchError {
    /// Timeouts count as network failures for callers.
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network { .. } | FetchError::Timeout { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("expected at least {required} paragraphs, found {found}")]
    MissingParagraphs { found: usize, required: usize },

    #[error("{field} paragraph is empty")]
    EmptyField { field: &'static str },
}
