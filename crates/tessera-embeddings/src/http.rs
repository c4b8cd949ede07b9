//! Blocking JSON POST with bounded retries, shared by the HTTP provider and
//! the HTTP scoring oracle.
//!
//! The provider traits are synchronous, so each call drives a current-thread
//! Tokio runtime. Callers inside async code must go through `spawn_blocking`.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Endpoint, credentials and retry policy for one remote service.
#[derive(Debug, Clone)]
pub(crate) struct HttpTarget {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_retries: u32,
    pub backoff_ms: u64,
    pub timeout: Duration,
}

impl HttpTarget {
    /// Delay before retry `attempt` (1-based): `backoff_ms * 2^(attempt-1)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(2u64.saturating_pow(attempt - 1)))
    }

    /// POST `body` as JSON and decode the response, retrying failures.
    /// Returns the last failure message once retries are exhausted.
    pub fn post_json<Req, Resp>(&self, body: &Req) -> Result<Resp, String>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let payload = serde_json::to_string(body).map_err(|e| format!("serialize request: {e}"))?;

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| format!("runtime error: {e}"))?;
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| format!("client error: {e}"))?;

        let mut last_err = String::from("no attempt made");
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                std::thread::sleep(self.backoff(attempt));
                debug!(attempt, endpoint = %self.endpoint, "retrying request");
            }
            match rt.block_on(self.send::<Resp>(&client, &payload)) {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    warn!(attempt, endpoint = %self.endpoint, error = %e, "request failed");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    async fn send<Resp: DeserializeOwned>(
        &self,
        client: &reqwest::Client,
        payload: &str,
    ) -> Result<Resp, String> {
        let mut request = client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .body(payload.to_string());
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await.map_err(|e| format!("HTTP error: {e}"))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("endpoint returned {status}: {body}"));
        }
        response
            .json::<Resp>()
            .await
            .map_err(|e| format!("JSON parse error: {e}"))
    }
}
