use regex::Regex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use crate::schema::MatchSpan;

/// Label the tagger assigns to tokens outside any trait.
pub const NO_TRAIT_LABEL: &str = "O";

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9']+|[^\w\s]").expect("valid token pattern"));

#[derive(Debug, thiserror::Error)]
pub enum TaggerError {
    #[error("tagger request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("tagger returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("tagger timed out after {0:?}")]
    Timeout(Duration),

    #[error("{message}")]
    InvalidResponse { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Character offset into the lower-cased source text, the same
    /// coordinates dictionary spans use.
    pub start: usize,
}

/// Splits text into runs of ASCII word characters (apostrophes included)
/// and single punctuation characters. Whitespace is dropped.
///
/// Lower-casing can change the character count (`İ` becomes two chars), so
/// offsets are counted over the lower-cased prefix.
pub fn tokenize(text: &str) -> Vec<Token> {
    TOKEN
        .find_iter(text)
        .map(|m| Token {
            text: m.as_str().to_string(),
            start: text[..m.start()].to_lowercase().chars().count(),
        })
        .collect()
}

/// A sequence labeller returning one label per input token.
pub trait TraitTagger: Send + Sync {
    fn predict(
        &self,
        tokens: &[String],
    ) -> impl Future<Output = Result<Vec<String>, TaggerError>> + Send;
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    tokens: &'a [String],
}

#[derive(Deserialize)]
struct PredictResponse {
    labels: Vec<String>,
}

/// HTTP client for the external tagger service.
#[derive(Clone)]
pub struct TaggerClient {
    base_url: String,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl TaggerClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            timeout: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn request(&self, tokens: &[String]) -> Result<Vec<String>, TaggerError> {
        let url = format!("{}/predict", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .json(&PredictRequest { tokens })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TaggerError::Status(response.status()));
        }

        let body: PredictResponse = response.json().await?;
        Ok(body.labels)
    }
}

impl TraitTagger for TaggerClient {
    async fn predict(&self, tokens: &[String]) -> Result<Vec<String>, TaggerError> {
        match self.timeout {
            Some(after) => tokio::time::timeout(after, self.request(tokens))
                .await
                .map_err(|_| TaggerError::Timeout(after))?,
            None => self.request(tokens).await,
        }
    }
}

/// Tokenizes `text`, asks the tagger for labels and keeps every token not
/// labelled [`NO_TRAIT_LABEL`] as a span typed by its label.
pub async fn tag_text<T: TraitTagger>(tagger: &T, text: &str) -> Result<Vec<MatchSpan>, TaggerError> {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let words: Vec<String> = tokens.iter().map(|t| t.text.clone()).collect();
    let labels = tagger.predict(&words).await?;

    if labels.len() != tokens.len() {
        return Err(TaggerError::InvalidResponse {
            message: format!(
                "tagger returned {} labels for {} tokens",
                labels.len(),
                tokens.len()
            ),
        });
    }

    let spans: Vec<MatchSpan> = tokens
        .into_iter()
        .zip(labels)
        .filter(|(_, label)| label != NO_TRAIT_LABEL)
        .map(|(token, label)| MatchSpan::new(label, token.start, token.text.to_lowercase()))
        .collect();

    tracing::debug!(tokens = words.len(), spans = spans.len(), "Tagged text");
    Ok(spans)
}
