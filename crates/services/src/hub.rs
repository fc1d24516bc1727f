use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::client::InferenceClient;
use crate::http::HostedModel;
use crate::models::{KeywordExtractor, ModelService, Recognizer, Summarizer, ZeroShotClassifier};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    pub base_url: String,
    pub ner_model: String,
    pub summarizer_model: String,
    pub keyword_model: String,
    pub classifier_model: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            ner_model: "d4data/biomedical-ner-all".to_string(),
            summarizer_model: "facebook/bart-large-cnn".to_string(),
            keyword_model: "keybert".to_string(),
            classifier_model: "facebook/bart-large-mnli".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub service: String,
    pub model: String,
    pub status: String,
}

/// Every model the analysis routes need, with one shared readiness flag.
///
/// Built unready; `init` probes each service and flips the flag only when
/// all of them answer.
pub struct ModelHub {
    recognizer: Arc<dyn Recognizer>,
    summarizer: Arc<dyn Summarizer>,
    keywords: Arc<dyn KeywordExtractor>,
    classifier: Arc<dyn ZeroShotClassifier>,
    ready: AtomicBool,
    init_lock: Mutex<()>,
}

impl ModelHub {
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        summarizer: Arc<dyn Summarizer>,
        keywords: Arc<dyn KeywordExtractor>,
        classifier: Arc<dyn ZeroShotClassifier>,
    ) -> Self {
        Self {
            recognizer,
            summarizer,
            keywords,
            classifier,
            ready: AtomicBool::new(false),
            init_lock: Mutex::new(()),
        }
    }

    /// Hub backed by the HTTP inference server.
    pub fn from_config(config: &ServicesConfig) -> Self {
        let client = InferenceClient::new(config.base_url.clone());
        let hosted = |model: &str| Arc::new(HostedModel::new(client.clone(), model.to_string()));

        Self::new(
            hosted(&config.ner_model),
            hosted(&config.summarizer_model),
            hosted(&config.keyword_model),
            hosted(&config.classifier_model),
        )
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Probe every service; mark the hub ready if all of them are.
    pub async fn init(&self) -> Result<()> {
        let _guard = self.init_lock.lock().await;
        if self.is_ready() {
            return Ok(());
        }

        let statuses = self.status().await;
        let failed: Vec<String> = statuses
            .iter()
            .filter(|s| s.status != "ok")
            .map(|s| format!("{} ({})", s.service, s.status))
            .collect();

        if !failed.is_empty() {
            warn!(failed = ?failed, "Model services not ready");
            anyhow::bail!("Models are not loaded: {}", failed.join(", "));
        }

        self.ready.store(true, Ordering::Release);
        info!("All model services ready");
        Ok(())
    }

    /// Ready fast path, otherwise one more `init` attempt.
    pub async fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }
        self.init().await
    }

    /// Probe each service concurrently.
    pub async fn status(&self) -> Vec<ServiceStatus> {
        let (ner, summary, keywords, classifier) = tokio::join!(
            probe("recognizer", self.recognizer.as_ref()),
            probe("summarizer", self.summarizer.as_ref()),
            probe("keywords", self.keywords.as_ref()),
            probe("classifier", self.classifier.as_ref()),
        );
        vec![ner, summary, keywords, classifier]
    }

    pub fn recognizer(&self) -> &dyn Recognizer {
        self.recognizer.as_ref()
    }

    pub fn summarizer(&self) -> &dyn Summarizer {
        self.summarizer.as_ref()
    }

    pub fn keywords(&self) -> &dyn KeywordExtractor {
        self.keywords.as_ref()
    }

    pub fn classifier(&self) -> &dyn ZeroShotClassifier {
        self.classifier.as_ref()
    }
}

async fn probe<S: ModelService + ?Sized>(service: &str, model: &S) -> ServiceStatus {
    let status = match model.ready().await {
        Ok(()) => "ok".to_string(),
        Err(e) => format!("error: {}", e),
    };
    ServiceStatus {
        service: service.to_string(),
        model: model.name().to_string(),
        status,
    }
}
