//! HTTP surface of the trait annotation service.

pub mod config;
pub mod errors;
pub mod metrics;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use extract::{AnnotatedRecord, Annotator, Field, TaggerClient, Vocabulary, tag_text};
use ingest::{EntrezClient, Pmid};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::AppConfig;
use errors::ApiError;
use metrics::{Metrics, MetricsSnapshot, TimedOperation};

pub struct AppState {
    pub annotator: Annotator<EntrezClient>,
    /// `None` when the tagger is disabled; responses then carry dictionary
    /// spans only.
    pub tagger: Option<TaggerClient>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let vocabulary = Arc::new(Vocabulary::load_or_empty(&config.vocabulary.path));

        let mut entrez =
            EntrezClient::new(config.entrez.base_url.clone(), config.entrez.database.clone())
                .context("Failed to create Entrez client")?
                .with_retmax(config.entrez.retmax)
                .with_api_key(config.entrez.api_key.clone());
        if config.entrez.timeout_secs > 0 {
            entrez = entrez.with_timeout(Duration::from_secs(config.entrez.timeout_secs));
        }

        let tagger = config.tagger.enabled.then(|| {
            let client = TaggerClient::new(config.tagger.base_url.clone());
            if config.tagger.timeout_secs > 0 {
                client.with_timeout(Duration::from_secs(config.tagger.timeout_secs))
            } else {
                client
            }
        });

        Ok(Self {
            annotator: Annotator::new(entrez, vocabulary),
            tagger,
            metrics: Metrics::new(),
        })
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    vocabulary_terms: usize,
    tagger: &'static str,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .route("/ner", get(missing_pmid))
        .route("/ner/", get(missing_pmid))
        .route("/ner/:pmid", get(get_ner))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        vocabulary_terms: state.annotator.vocabulary().len(),
        tagger: if state.tagger.is_some() { "enabled" } else { "disabled" },
    })
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn missing_pmid() -> ApiError {
    ApiError::BadRequest("PMID is required".to_string())
}

async fn get_ner(
    State(state): State<Arc<AppState>>,
    Path(raw_pmid): Path<String>,
) -> Result<Json<AnnotatedRecord>, ApiError> {
    let result = annotate_request(&state, &raw_pmid).await;
    state.metrics.record_request(result.is_ok());
    result.map(Json)
}

async fn annotate_request(state: &AppState, raw_pmid: &str) -> Result<AnnotatedRecord, ApiError> {
    let pmid: Pmid = raw_pmid.parse().map_err(|e| {
        tracing::warn!(error = %e, "Rejected PMID");
        ApiError::BadRequest("PMID must be a positive integer".to_string())
    })?;

    let timer = TimedOperation::start();
    let mut record = state.annotator.annotate(pmid).await.map_err(|e| {
        tracing::error!(%pmid, stage = %e.stage(), error = %e, "Annotation failed");
        ApiError::Internal(format!("Error fetching file, {}", e))
    })?;
    state.metrics.record_annotate(
        timer.elapsed(),
        record.traits(Field::Title).len() + record.traits(Field::Abstract).len(),
    );

    let Some(tagger) = &state.tagger else {
        return Ok(record);
    };

    for field in [Field::Abstract, Field::Title] {
        let timer = TimedOperation::start();
        let spans = tag_text(tagger, record.text(field)).await.map_err(|e| {
            tracing::error!(%pmid, %field, error = %e, "Tagging failed");
            ApiError::Internal(format!("Error predicting {} NER, {}", field, e))
        })?;
        state.metrics.record_tag(timer.elapsed(), spans.len());
        record.append_model_spans(field, spans);
    }

    Ok(record)
}
