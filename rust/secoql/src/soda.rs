//! Thin client for the Socrata SODA endpoint serving the contracts dataset.

use crate::config::AppConfig;
use anyhow::Result;
use reqwest::{header::ACCEPT, Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SodaError {
    #[error("upstream returned status {status}")]
    Status { status: StatusCode, body: String },

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned a non-array payload")]
    Shape,
}

impl SodaError {
    /// Diagnostic detail surfaced to callers when a fetch is fatal.
    pub fn detail(&self) -> String {
        match self {
            SodaError::Status { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct SodaClient {
    client: Client,
    dataset_url: String,
    app_token: Option<String>,
}

impl SodaClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            dataset_url: config.dataset_url.clone(),
            app_token: config.app_token.clone(),
        })
    }

    /// Runs one SoQL query and returns the JSON row array.
    pub async fn rows(&self, params: &[(String, String)]) -> Result<Vec<Value>, SodaError> {
        let mut request = self
            .client
            .get(self.dataset_url.as_str())
            .header(ACCEPT, "application/json")
            .query(params);
        if let Some(token) = &self.app_token {
            request = request.header("X-App-Token", token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SodaError::Status { status, body });
        }

        match response.json().await? {
            Value::Array(rows) => Ok(rows),
            _ => Err(SodaError::Shape),
        }
    }
}
