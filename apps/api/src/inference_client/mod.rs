/// Inference Client — the single point of entry for all hosted-model calls.
///
/// ARCHITECTURAL RULE: No other module may talk to the inference endpoint directly.
/// The classifier and the feedback generator both go through `InferenceClient::call`.
///
/// Endpoint shape: `POST {base_url}/{model}` with a JSON body, Hugging Face style.
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const REQUEST_TIMEOUT_SECS: u64 = 120;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model unavailable after {retries} retries")]
    Unavailable { retries: u32 },
}

/// Error payload returned by the endpoint,
/// e.g. `{"error": "Model is loading", "estimated_time": 20.0}`.
/// `error` is a string for most failures and a list of strings for validation failures.
#[derive(Debug, Deserialize)]
struct EndpointError {
    error: serde_json::Value,
    #[serde(default)]
    estimated_time: Option<f64>,
}

/// Shared client for the hosted models. Cheap to clone; the underlying
/// connection pool is reused across requests.
#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl InferenceClient {
    pub fn new(
        base_url: impl Into<String>,
        api_token: Option<String>,
    ) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
        })
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/{}", self.base_url, model.trim_start_matches('/'))
    }

    /// Posts `body` to the model endpoint and deserializes the JSON response.
    /// Retries on transport errors, 429, and 5xx (503 is the "model loading" signal)
    /// with exponential backoff.
    pub async fn call<B, T>(&self, model: &str, body: &B) -> Result<T, InferenceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(model);
        let mut last_error: Option<InferenceError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                warn!(
                    "Inference call to {} attempt {} failed, retrying after {}ms...",
                    model,
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.post(&url).json(body);
            if let Some(token) = &self.api_token {
                request = request.bearer_auth(token);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(InferenceError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if is_retryable(status) {
                let body = response.text().await.unwrap_or_default();
                warn!("Inference endpoint returned {}: {}", status, body);
                last_error = Some(InferenceError::Api {
                    status: status.as_u16(),
                    message: error_message(&body),
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(InferenceError::Api {
                    status: status.as_u16(),
                    message: error_message(&body),
                });
            }

            let bytes = response.bytes().await?;
            debug!(
                "Inference call to {} succeeded: {} bytes",
                model,
                bytes.len()
            );

            return serde_json::from_slice(&bytes).map_err(InferenceError::Parse);
        }

        Err(last_error.unwrap_or(InferenceError::Unavailable {
            retries: MAX_RETRIES,
        }))
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// 1s, 2s, 4s, ...
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000 * (1 << attempt.saturating_sub(1).min(6)))
}

/// Pulls the human-readable message out of an endpoint error body, falling
/// back to the raw body when it is not the expected JSON.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<EndpointError>(body) {
        Ok(EndpointError {
            error,
            estimated_time,
        }) => {
            let message = match error {
                serde_json::Value::String(s) => s,
                serde_json::Value::Array(items) => items
                    .iter()
                    .map(|v| v.as_str().map(String::from).unwrap_or_else(|| v.to_string()))
                    .collect::<Vec<_>>()
                    .join("; "),
                other => other.to_string(),
            };
            match estimated_time {
                Some(secs) => format!("{message} (estimated time {secs:.0}s)"),
                None => message,
            }
        }
        Err(_) => body.trim().to_string(),
    }
}
