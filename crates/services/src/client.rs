use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Thin JSON client for the model inference server.
#[derive(Clone)]
pub struct InferenceClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct StatusRequest<'a> {
    model: &'a str,
}

#[derive(Deserialize)]
struct StatusResponse {
    ready: bool,
}

impl InferenceClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// POST `body` to `/api/{task}` and decode the JSON reply.
    pub async fn post<B, R>(&self, task: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/api/{}", self.base_url, task);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .context(format!("Failed to send {} request", task))?;

        if !response.status().is_success() {
            anyhow::bail!("{} request failed: {}", task, response.status());
        }

        response
            .json()
            .await
            .context(format!("Failed to parse {} response", task))
    }

    /// Whether the server has `model` loaded and ready to serve.
    pub async fn model_ready(&self, model: &str) -> Result<bool> {
        let status: StatusResponse = self.post("status", &StatusRequest { model }).await?;
        Ok(status.ready)
    }
}
