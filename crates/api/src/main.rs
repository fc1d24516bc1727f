mod cache;
mod config;
mod error;
mod metrics;
mod retry;

use anyhow::Context;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use extract::{Entity, RawSpan, StructuredReport};
use ingest::{Transcript, SAMPLE_TRANSCRIPT};
use serde::{Deserialize, Serialize};
use services::{ModelHub, SentimentIntent, ServiceStatus};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, warn, Instrument};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::cache::{Cache, CacheStats};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::metrics::{Metrics, MetricsSnapshot, TimedOperation};
use crate::retry::RetryPolicy;

struct AppState {
    config: AppConfig,
    hub: Arc<ModelHub>,
    cache: Cache<AnalyzeResponse>,
    metrics: Arc<Metrics>,
    limiter: Semaphore,
    retry: RetryPolicy,
}

impl AppState {
    fn new(config: AppConfig, hub: Arc<ModelHub>) -> Self {
        Self {
            cache: Cache::new(config.cache.max_entries),
            metrics: Metrics::new(),
            limiter: Semaphore::new(config.concurrency.max_concurrent_analyses.max(1)),
            retry: RetryPolicy::from_config(&config.retry),
            config,
            hub,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct AnalyzeRequest {
    /// Falls back to the bundled sample transcript when absent
    transcript: Option<String>,
    /// Pre-computed recognizer output; skips the recognizer when present
    spans: Option<Vec<RawSpan>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AnalyzeResponse {
    full_report_text: String,
    structured_report: StructuredReport,
    summary: String,
    keywords: Vec<String>,
    ner_debug: Vec<Entity>,
}

#[derive(Debug, Default, Deserialize)]
struct SentimentRequest {
    transcript: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    ready: bool,
    services: Vec<ServiceStatus>,
}

#[derive(Serialize)]
struct StatsResponse {
    metrics: MetricsSnapshot,
    cache: CacheStats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load()?;

    // Models are an injected dependency; the server starts even if they are not up yet
    let hub = Arc::new(ModelHub::from_config(&config.services));
    if let Err(e) = hub.init().await {
        warn!(error = %e, "Starting without models, will retry on first request");
    }

    let bind_addr = config.server.bind_addr.clone();
    let app = build_router(Arc::new(AppState::new(config, hub)));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context(format!("Failed to bind {}", bind_addr))?;

    info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check).post(health_check))
        .route("/analyze", post(analyze))
        .route("/analyze_sentiment", post(analyze_sentiment))
        .route("/stats", get(get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ready: state.hub.is_ready(),
        services: state.hub.status().await,
    })
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    req: Option<Json<AnalyzeRequest>>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let request_id = Uuid::new_v4();

    let result = with_timeout(&state, run_analysis(&state, req))
        .instrument(info_span!("analyze", %request_id))
        .await;

    if let Err(e) = &result {
        warn!(%request_id, error = %e, "Analysis failed");
    }
    state.metrics.record_request(result.is_ok());
    result.map(Json)
}

async fn run_analysis(state: &AppState, req: AnalyzeRequest) -> Result<AnalyzeResponse, ApiError> {
    let _permit = state
        .limiter
        .acquire()
        .await
        .map_err(|_| ApiError::NotReady("Analysis queue closed".to_string()))?;
    let timer = TimedOperation::start();

    let transcript = match req.transcript {
        Some(text) => Transcript::inline(text),
        None => Transcript::new(SAMPLE_TRANSCRIPT.to_string(), "sample".to_string()),
    };

    let use_cache = state.config.cache.enabled && req.spans.is_none();
    if use_cache {
        if let Some(hit) = state.cache.get(&transcript.transcript_id) {
            state.metrics.record_cache_hit();
            info!(transcript_id = %transcript.transcript_id, "Serving cached analysis");
            return Ok(hit);
        }
    }

    state
        .hub
        .ensure_ready()
        .await
        .map_err(|e| ApiError::NotReady(e.to_string()))?;

    let text = transcript.text.as_str();

    let (raw, caller_spans) = match req.spans {
        Some(spans) => (spans, true),
        None => {
            let spans = state
                .retry
                .retry("recognize", || state.hub.recognizer().recognize(text))
                .await
                .map_err(ApiError::Upstream)?;
            (spans, false)
        }
    };

    let analysis = extract::analyze(text, &raw).map_err(|e| {
        if caller_spans {
            ApiError::InvalidSpans(e)
        } else {
            ApiError::RecognizerContract(e)
        }
    })?;

    let summary_options = state.config.summary;
    let summary = state
        .retry
        .retry("summarize", || state.hub.summarizer().summarize(text, summary_options))
        .await
        .map_err(ApiError::Upstream)?;

    let top_n = state.config.keywords.top_n;
    let keywords = state
        .retry
        .retry("keywords", || state.hub.keywords().keywords(text, top_n))
        .await
        .map_err(ApiError::Upstream)?;

    let full_report_text = report::render_report(
        &analysis.report,
        &summary,
        &state.config.report,
        Local::now().naive_local(),
    );

    state
        .metrics
        .record_analysis(timer.elapsed(), raw.len(), analysis.entities.len());

    let response = AnalyzeResponse {
        full_report_text,
        structured_report: analysis.report,
        summary,
        keywords,
        ner_debug: analysis.entities,
    };

    if use_cache {
        state.cache.set(&transcript.transcript_id, response.clone());
    }

    Ok(response)
}

async fn analyze_sentiment(
    State(state): State<Arc<AppState>>,
    req: Option<Json<SentimentRequest>>,
) -> Result<Json<SentimentIntent>, ApiError> {
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let timer = TimedOperation::start();

    let result = with_timeout(&state, async {
        state
            .hub
            .ensure_ready()
            .await
            .map_err(|e| ApiError::NotReady(e.to_string()))?;

        let transcript = req.transcript.as_deref().unwrap_or(SAMPLE_TRANSCRIPT);
        let patient_text = ingest::patient_dialogue(transcript).ok_or_else(|| {
            ApiError::BadRequest("No patient dialogue found in the transcript.".to_string())
        })?;

        state
            .retry
            .retry("classify", || {
                services::analyze_sentiment_intent(state.hub.classifier(), &patient_text)
            })
            .await
            .map_err(ApiError::Upstream)
    })
    .await;

    if result.is_ok() {
        state.metrics.record_sentiment(timer.elapsed());
    }
    state.metrics.record_request(result.is_ok());
    result.map(Json)
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        metrics: state.metrics.snapshot(),
        cache: state.cache.stats(),
    })
}

/// Caller-level timeout around a whole model-backed request.
async fn with_timeout<T>(
    state: &AppState,
    fut: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    let secs = state.config.concurrency.request_timeout_secs;
    tokio::time::timeout(Duration::from_secs(secs), fut)
        .await
        .map_err(|_| ApiError::Timeout(secs))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use services::{
        Classification, KeywordExtractor, ModelService, Recognizer, Summarizer, SummaryOptions,
        ZeroShotClassifier,
    };
    use tower::ServiceExt;

    const TEXT: &str = "Patient: I have severe neck pain and back pain. It has been a rough few weeks at work for me. Full recovery within six months.";

    /// In-process stand-in for every model service.
    struct StubModels {
        ready: bool,
        spans: Vec<RawSpan>,
    }

    #[async_trait]
    impl ModelService for StubModels {
        fn name(&self) -> &str {
            "stub"
        }

        async fn ready(&self) -> Result<()> {
            if self.ready {
                Ok(())
            } else {
                anyhow::bail!("not loaded")
            }
        }
    }

    #[async_trait]
    impl Recognizer for StubModels {
        async fn recognize(&self, _text: &str) -> Result<Vec<RawSpan>> {
            Ok(self.spans.clone())
        }
    }

    #[async_trait]
    impl Summarizer for StubModels {
        async fn summarize(&self, _text: &str, _options: SummaryOptions) -> Result<String> {
            Ok("Patient reports neck and back pain after a car accident.".to_string())
        }
    }

    #[async_trait]
    impl KeywordExtractor for StubModels {
        async fn keywords(&self, _text: &str, top_n: usize) -> Result<Vec<String>> {
            Ok(vec!["neck pain".to_string(), "recovery".to_string()]
                .into_iter()
                .take(top_n)
                .collect())
        }
    }

    #[async_trait]
    impl ZeroShotClassifier for StubModels {
        async fn classify(&self, _text: &str, labels: &[&str]) -> Result<Classification> {
            Ok(Classification {
                labels: labels.iter().map(|l| l.to_string()).collect(),
                scores: vec![0.5; labels.len()],
            })
        }
    }

    fn text_spans() -> Vec<RawSpan> {
        vec![
            RawSpan::new(23, 27, "Biological_structure", 0.88),
            RawSpan::new(28, 32, "Sign_symptom", 0.95),
            RawSpan::new(37, 41, "Sign_symptom", 0.71),
            RawSpan::new(42, 46, "Sign_symptom", 0.93),
        ]
    }

    async fn app_with(ready: bool, spans: Vec<RawSpan>) -> Router {
        let models = Arc::new(StubModels { ready, spans });
        let hub = Arc::new(ModelHub::new(
            models.clone(),
            models.clone(),
            models.clone(),
            models,
        ));
        let _ = hub.init().await;

        let mut config = AppConfig::default();
        config.retry.initial_backoff_ms = 1;
        config.retry.max_backoff_ms = 1;
        build_router(Arc::new(AppState::new(config, hub)))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_analyze_with_recognizer() {
        let app = app_with(true, text_spans()).await;
        let (status, body) = send(&app, "POST", "/analyze", Some(json!({ "transcript": TEXT }))).await;

        assert_eq!(status, StatusCode::OK);
        let symptoms = body["structured_report"]["Symptoms"].as_array().unwrap();
        assert_eq!(symptoms, &vec![json!("neck pain"), json!("back pain")]);
        assert_eq!(
            body["structured_report"]["Prognosis"],
            "Full recovery within six months."
        );
        assert_eq!(body["ner_debug"].as_array().unwrap().len(), 2);
        assert_eq!(body["ner_debug"][0]["entity_group"], "Sign_symptom");
        assert_eq!(body["keywords"][0], "neck pain");

        let report = body["full_report_text"].as_str().unwrap();
        assert!(report.contains("MEDICAL CONSULTATION REPORT"));
        assert!(report.contains("- neck pain\n- back pain"));
    }

    #[tokio::test]
    async fn test_analyze_with_caller_spans() {
        let app = app_with(true, Vec::new()).await;
        let spans = json!([
            { "entity_group": "Therapeutic_procedure", "score": 0.9, "word": "physio", "start": 0, "end": 13 }
        ]);
        let (status, body) = send(
            &app,
            "POST",
            "/analyze",
            Some(json!({ "transcript": "physiotherapy sessions", "spans": spans })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["structured_report"]["Treatment"], json!(["physiotherapy"]));
        assert_eq!(body["structured_report"]["Symptoms"], json!(["Not mentioned"]));
    }

    #[tokio::test]
    async fn test_malformed_caller_spans_rejected() {
        let app = app_with(true, Vec::new()).await;
        let spans = json!([{ "label": "Sign_symptom", "end": 4, "confidence": 0.5 }]);
        let (status, body) = send(
            &app,
            "POST",
            "/analyze",
            Some(json!({ "transcript": "pain", "spans": spans })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("missing `start`"));
    }

    #[tokio::test]
    async fn test_malformed_recognizer_output_is_bad_gateway() {
        let app = app_with(true, vec![RawSpan::new(0, 500, "Sign_symptom", 0.5)]).await;
        let (status, body) = send(&app, "POST", "/analyze", Some(json!({ "transcript": "pain" }))).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("exceeds text length"));
    }

    #[tokio::test]
    async fn test_models_not_ready() {
        let app = app_with(false, Vec::new()).await;
        let (status, body) = send(&app, "POST", "/analyze", Some(json!({ "transcript": TEXT }))).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().starts_with("Models are not loaded"));

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ready"], false);
    }

    #[tokio::test]
    async fn test_unknown_fields_do_not_reach_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("private_notes.md");
        std::fs::write(&path, "Good morning, Mr. Secret. occasional password hunter2.").unwrap();

        let app = app_with(true, Vec::new()).await;
        let (status, body) = send(
            &app,
            "POST",
            "/analyze",
            Some(json!({ "path": path.to_string_lossy(), "spans": [] })),
        )
        .await;

        // Only the sample transcript is analyzed
        assert_eq!(status, StatusCode::OK);
        let report = &body["structured_report"];
        assert_eq!(report["Patient_Name"], "Ms. Jones");
        assert!(!body.to_string().contains("hunter2"));
    }

    #[tokio::test]
    async fn test_repeat_analysis_served_from_cache() {
        let app = app_with(true, text_spans()).await;
        let request = json!({ "transcript": TEXT });

        let (first, _) = send(&app, "POST", "/analyze", Some(request.clone())).await;
        let (second, _) = send(&app, "POST", "/analyze", Some(request)).await;
        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::OK);

        let (_, stats) = send(&app, "GET", "/stats", None).await;
        assert_eq!(stats["metrics"]["cache_hits"], 1);
        assert_eq!(stats["metrics"]["analyses"], 1);
        assert_eq!(stats["cache"]["analyses_cached"], 1);
    }

    #[tokio::test]
    async fn test_sentiment() {
        let app = app_with(true, Vec::new()).await;
        let (status, body) = send(&app, "POST", "/analyze_sentiment", Some(json!({}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "Sentiment": "Anxious", "Intent": "Seeking reassurance" }));
    }

    #[tokio::test]
    async fn test_sentiment_without_patient_dialogue() {
        let app = app_with(true, Vec::new()).await;
        let (status, body) = send(
            &app,
            "POST",
            "/analyze_sentiment",
            Some(json!({ "transcript": "Physician: Hello?" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No patient dialogue found in the transcript.");
    }
}
