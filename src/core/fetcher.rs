use crate::core::{DateWindow, Record};
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_API_ENDPOINT: &str =
    "https://www.consumerfinance.gov/data-research/consumer-complaints/search/api/v1/";

/// Client for the consumer-complaints search API.
#[derive(Debug, Clone)]
pub struct ComplaintFetcher {
    client: Client,
    endpoint: String,
}

impl ComplaintFetcher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// 以單一 GET 取得區間內的投訴資料並取出每個 `_source`
    pub async fn fetch(&self, window: &DateWindow) -> Result<Vec<Record>> {
        let from_date = window.from_date_str();
        let to_date = window.to_date_str();

        tracing::debug!(
            "Making API request to: {} ({}..{})",
            self.endpoint,
            from_date,
            to_date
        );
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("date_received_max", to_date.as_str()),
                ("date_received_min", from_date.as_str()),
                ("field", "all"),
                ("format", "json"),
            ])
            .send()
            .await?;

        tracing::debug!("API response status: {}", response.status());
        let body = response.error_for_status()?.bytes().await?;
        let payload: serde_json::Value = serde_json::from_slice(&body)?;

        extract_sources(payload)
    }
}

/// Keeps the `_source` object of every envelope and drops the rest.
pub fn extract_sources(payload: serde_json::Value) -> Result<Vec<Record>> {
    let serde_json::Value::Array(envelopes) = payload else {
        return Err(EtlError::ProcessingError {
            message: "expected a JSON array of envelopes".to_string(),
        });
    };

    let total = envelopes.len();
    let records: Vec<Record> = envelopes
        .into_iter()
        .filter_map(|envelope| match envelope {
            serde_json::Value::Object(mut obj) => obj.remove("_source"),
            _ => None,
        })
        .filter_map(|source| match source {
            serde_json::Value::Object(data) => Some(Record { data }),
            other => {
                tracing::warn!("Skipping non-object _source value: {}", other);
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::debug!(
            "Dropped {} envelopes without a _source object",
            total - records.len()
        );
    }

    Ok(records)
}
