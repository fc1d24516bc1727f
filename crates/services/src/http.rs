use anyhow::{Context, Result};
use async_trait::async_trait;
use extract::RawSpan;
use serde::{Deserialize, Serialize};

use crate::client::InferenceClient;
use crate::models::{
    Classification, KeywordExtractor, ModelService, Recognizer, Summarizer, SummaryOptions,
    ZeroShotClassifier,
};

/// One model hosted by the inference server.
#[derive(Clone)]
pub struct HostedModel {
    client: InferenceClient,
    model: String,
}

impl HostedModel {
    pub fn new(client: InferenceClient, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl ModelService for HostedModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn ready(&self) -> Result<()> {
        if self.client.model_ready(&self.model).await? {
            Ok(())
        } else {
            anyhow::bail!("model {} is not loaded", self.model)
        }
    }
}

#[derive(Serialize)]
struct NerRequest<'a> {
    model: &'a str,
    text: &'a str,
    aggregation_strategy: &'a str,
}

#[async_trait]
impl Recognizer for HostedModel {
    async fn recognize(&self, text: &str) -> Result<Vec<RawSpan>> {
        let request = NerRequest {
            model: &self.model,
            text,
            aggregation_strategy: "simple",
        };
        self.client.post("ner", &request).await
    }
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    model: &'a str,
    text: &'a str,
    max_length: usize,
    min_length: usize,
    do_sample: bool,
}

#[derive(Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

#[async_trait]
impl Summarizer for HostedModel {
    async fn summarize(&self, text: &str, options: SummaryOptions) -> Result<String> {
        let request = SummarizeRequest {
            model: &self.model,
            text,
            max_length: options.max_length,
            min_length: options.min_length,
            do_sample: false,
        };
        let outputs: Vec<SummaryOutput> = self.client.post("summarize", &request).await?;

        outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text)
            .context("Summarizer returned no output")
    }
}

#[derive(Serialize)]
struct KeywordRequest<'a> {
    model: &'a str,
    text: &'a str,
    top_n: usize,
    stop_words: &'a str,
}

#[async_trait]
impl KeywordExtractor for HostedModel {
    async fn keywords(&self, text: &str, top_n: usize) -> Result<Vec<String>> {
        let request = KeywordRequest {
            model: &self.model,
            text,
            top_n,
            stop_words: "english",
        };
        // [[keyphrase, score], ...]
        let scored: Vec<(String, f64)> = self.client.post("keywords", &request).await?;
        Ok(scored.into_iter().map(|(keyword, _)| keyword).collect())
    }
}

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    model: &'a str,
    text: &'a str,
    candidate_labels: &'a [&'a str],
}

#[async_trait]
impl ZeroShotClassifier for HostedModel {
    async fn classify(&self, text: &str, labels: &[&str]) -> Result<Classification> {
        let request = ZeroShotRequest {
            model: &self.model,
            text,
            candidate_labels: labels,
        };
        self.client.post("zero-shot", &request).await
    }
}
