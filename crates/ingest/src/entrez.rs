use regex::Regex;
use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use crate::error::{FetchError, FetchStep};
use crate::record::{Pmid, RawRecord};

pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/";
pub const DEFAULT_DATABASE: &str = "pubmed";
pub const DEFAULT_RETMAX: u32 = 100;

static WEB_ENV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<WebEnv>(\S+)</WebEnv>").expect("valid WebEnv pattern"));
static QUERY_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<QueryKey>(\d+?)</QueryKey>").expect("valid QueryKey pattern"));

/// Anything that can produce the raw flat-text record for an identifier.
pub trait RecordSource: Send + Sync {
    fn fetch(&self, pmid: Pmid) -> impl Future<Output = Result<RawRecord, FetchError>> + Send;
}

/// Server-side history handle issued by esearch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSession {
    pub web_env: String,
    pub query_key: String,
}

impl SearchSession {
    /// Scans an esearch body for the first WebEnv and QueryKey markers.
    pub fn from_search_body(body: &str) -> Result<Self, FetchError> {
        let web_env = WEB_ENV
            .captures(body)
            .map(|c| c[1].to_string())
            .ok_or(FetchError::Protocol { marker: "<WebEnv>" })?;
        let query_key = QUERY_KEY
            .captures(body)
            .map(|c| c[1].to_string())
            .ok_or(FetchError::Protocol {
                marker: "<QueryKey>",
            })?;

        Ok(Self { web_env, query_key })
    }
}

/// Stateless E-utilities client. Each fetch threads its own session from
/// esearch into efetch, so one client serves concurrent requests.
#[derive(Clone)]
pub struct EntrezClient {
    base_url: String,
    database: String,
    retmax: u32,
    api_key: Option<String>,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl EntrezClient {
    pub fn new(base_url: String, database: String) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            base_url,
            database,
            retmax: DEFAULT_RETMAX,
            api_key: None,
            timeout: None,
            client,
        })
    }

    pub fn with_retmax(mut self, retmax: u32) -> Self {
        self.retmax = retmax;
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Bounds the whole search + fetch exchange.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn endpoint(&self, utility: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, utility)
        } else {
            format!("{}/{}", self.base_url, utility)
        }
    }

    async fn get_text(
        &self,
        step: FetchStep,
        url: String,
        mut params: Vec<(&'static str, String)>,
    ) -> Result<String, FetchError> {
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }

        let network = |source| FetchError::Network { step, source };

        self.client
            .get(&url)
            .query(&params)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(network)?
            .text()
            .await
            .map_err(network)
    }

    /// Step 1: esearch with history enabled.
    pub async fn search(&self, pmid: Pmid) -> Result<SearchSession, FetchError> {
        let params = vec![
            ("db", self.database.clone()),
            ("term", pmid.to_string()),
            ("retmax", self.retmax.to_string()),
            ("usehistory", "y".to_string()),
            ("rettype", "json".to_string()),
        ];
        let body = self
            .get_text(FetchStep::Search, self.endpoint("esearch.fcgi"), params)
            .await?;

        let session = SearchSession::from_search_body(&body)?;
        tracing::debug!(%pmid, query_key = %session.query_key, "esearch session opened");
        Ok(session)
    }

    /// Step 2: efetch the abstract-mode text for a session.
    pub async fn efetch(&self, session: &SearchSession) -> Result<String, FetchError> {
        let params = vec![
            ("db", self.database.clone()),
            ("WebEnv", session.web_env.clone()),
            ("query_key", session.query_key.clone()),
            ("retmode", "text".to_string()),
            ("rettype", "abstract".to_string()),
            ("retmax", self.retmax.to_string()),
        ];
        self.get_text(FetchStep::Fetch, self.endpoint("efetch.fcgi"), params)
            .await
    }

    async fn exchange(&self, pmid: Pmid) -> Result<RawRecord, FetchError> {
        let session = self.search(pmid).await?;
        let body = self.efetch(&session).await?;
        Ok(RawRecord::new(pmid, body))
    }
}

impl RecordSource for EntrezClient {
    async fn fetch(&self, pmid: Pmid) -> Result<RawRecord, FetchError> {
        match self.timeout {
            Some(after) => tokio::time::timeout(after, self.exchange(pmid))
                .await
                .map_err(|_| FetchError::Timeout { after })?,
            None => self.exchange(pmid).await,
        }
    }
}
