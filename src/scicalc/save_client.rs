//! # Remote Save Client
//!
//! Sends finished calculations to a persistence endpoint and reads back the
//! most recent ones.
//!
//! ## Protocol
//!
//! - **Save**: one `POST` of `{"expression": "...", "result": "..."}`. A 2xx
//!   answer carries `{"id": N, "message": "..."}`. No retries.
//! - **List**: `GET` returns `{"calculations": [{id, expression, result,
//!   created_at}, ...]}`, newest first.
//!
//! The endpoint is whatever [`calculations server`](crate::server) (or a
//! compatible service) is mounted at.
//!
//! ## Example
//!
//! ```rust,no_run
//! use scicalc::SaveClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = SaveClient::new("http://127.0.0.1:8080/calculations");
//!     client.with_timeout(std::time::Duration::from_secs(5));
//!
//!     let receipt = client.save("7 add 3", "10").await?;
//!     println!("saved as #{}", receipt.id);
//!
//!     for calc in client.recent().await? {
//!         println!("{} = {} ({})", calc.expression, calc.result, calc.created_at);
//!     }
//!     Ok(())
//! }
//! ```

use std::error::Error;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Error type for save client operations.
#[derive(Debug, Clone)]
pub struct SaveError {
    message: String,
    status: Option<u16>,
}

impl SaveError {
    pub fn new(message: impl Into<String>) -> Self {
        SaveError {
            message: message.into(),
            status: None,
        }
    }

    fn with_status(message: impl Into<String>, status: u16) -> Self {
        SaveError {
            message: message.into(),
            status: Some(status),
        }
    }

    /// HTTP status of the rejection, if the endpoint answered at all.
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Save error: {}", self.message)
    }
}

impl Error for SaveError {}

/// Body of a save request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub expression: String,
    pub result: String,
}

/// Successful save answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub id: u64,
    pub message: String,
}

/// A calculation as stored by the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCalculation {
    pub id: u64,
    pub expression: String,
    pub result: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct CalculationList {
    calculations: Vec<SavedCalculation>,
}

/// HTTP client for the calculations endpoint.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct SaveClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl SaveClient {
    /// Create a client for `endpoint` with a 30 second timeout.
    pub fn new(endpoint: impl Into<String>) -> Self {
        SaveClient {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(&mut self, duration: Duration) -> &mut Self {
        self.timeout = duration;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// POST one calculation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent, times out, the
    /// endpoint answers with a non-2xx status, or the answer is not a
    /// receipt.
    pub async fn save(&self, expression: &str, result: &str) -> Result<SaveReceipt, SaveError> {
        let payload = SaveRequest {
            expression: expression.to_string(),
            result: result.to_string(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| SaveError::new(format!("POST request failed: {}", e)))?;

        let response = Self::check_status(response).await?;
        response
            .json::<SaveReceipt>()
            .await
            .map_err(|e| SaveError::new(format!("Failed to parse receipt: {}", e)))
    }

    /// GET the most recent saved calculations, newest first.
    pub async fn recent(&self) -> Result<Vec<SavedCalculation>, SaveError> {
        let response = self
            .client
            .get(&self.endpoint)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| SaveError::new(format!("GET request failed: {}", e)))?;

        let response = Self::check_status(response).await?;
        let list = response
            .json::<CalculationList>()
            .await
            .map_err(|e| SaveError::new(format!("Failed to parse calculations: {}", e)))?;
        Ok(list.calculations)
    }

    /// Turn a non-2xx answer into an error, preferring the endpoint's own
    /// `{"error": "..."}` message.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SaveError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<JsonValue>(&body)
            .ok()
            .and_then(|v| v["error"].as_str().map(str::to_string))
            .unwrap_or(body);

        Err(SaveError::with_status(
            format!("endpoint answered {}: {}", status.as_u16(), reason),
            status.as_u16(),
        ))
    }
}
