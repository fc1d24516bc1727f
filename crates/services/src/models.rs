//! Model services the analysis consumes, behind object-safe traits so the
//! API can run against the HTTP clients or in-process stand-ins.

use anyhow::Result;
use async_trait::async_trait;
use extract::RawSpan;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait ModelService: Send + Sync {
    /// Model identifier, used in logs and health output.
    fn name(&self) -> &str;

    /// Succeeds once the backing model can serve requests.
    async fn ready(&self) -> Result<()>;
}

/// Token-classification model producing raw entity spans.
#[async_trait]
pub trait Recognizer: ModelService {
    async fn recognize(&self, text: &str) -> Result<Vec<RawSpan>>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SummaryOptions {
    pub max_length: usize,
    pub min_length: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            max_length: 130,
            min_length: 60,
        }
    }
}

#[async_trait]
pub trait Summarizer: ModelService {
    async fn summarize(&self, text: &str, options: SummaryOptions) -> Result<String>;
}

#[async_trait]
pub trait KeywordExtractor: ModelService {
    /// Top `top_n` keyphrases, best first.
    async fn keywords(&self, text: &str, top_n: usize) -> Result<Vec<String>>;
}

/// Zero-shot output: candidate labels ordered by descending score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

impl Classification {
    pub fn top(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }
}

#[async_trait]
pub trait ZeroShotClassifier: ModelService {
    async fn classify(&self, text: &str, labels: &[&str]) -> Result<Classification>;
}
