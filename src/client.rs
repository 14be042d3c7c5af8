//! Bot backend API client
//!
//! Three calls:
//! - `GET /api/status` - full status snapshot
//! - `GET /api/config` - persisted operator configuration
//! - `POST /api/config` - full or partial configuration update
//!
//! No retries here; failures go back to the caller.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::types::{Ack, ConfigState, StatusSnapshot};

pub const STATUS_PATH: &str = "/api/status";
pub const CONFIG_PATH: &str = "/api/config";

/// What the dashboard needs from the backend
#[allow(async_fn_in_trait)] // Single-threaded page, futures need not be Send
pub trait DashboardApi {
    async fn fetch_status(&self) -> Result<StatusSnapshot>;

    async fn fetch_config(&self) -> Result<ConfigState>;

    /// Only fields present in `update` change server-side
    async fn submit_config(&self, update: &ConfigState) -> Result<Ack>;
}

/// HTTP implementation over reqwest
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    base: String,
}

impl HttpApi {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: config.api_base.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .header("Accept", "application/json")
            .send()
            .await?;

        let body = Self::read_body(response).await?;
        serde_json::from_str(&body).map_err(DashboardError::from)
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<String> {
        let response = self
            .http
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(body)?)
            .send()
            .await?;

        Self::read_body(response).await
    }

    /// Check status and return the body text. Decoding is left to the
    /// caller so parse failures stay distinct from network failures.
    async fn read_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            return Err(DashboardError::Network(format!("HTTP {status}: {error_text}")));
        }

        response.text().await.map_err(DashboardError::from)
    }
}

impl DashboardApi for HttpApi {
    async fn fetch_status(&self) -> Result<StatusSnapshot> {
        self.get(STATUS_PATH).await
    }

    async fn fetch_config(&self) -> Result<ConfigState> {
        self.get(CONFIG_PATH).await
    }

    async fn submit_config(&self, update: &ConfigState) -> Result<Ack> {
        let body = self.post(CONFIG_PATH, update).await?;
        if body.trim().is_empty() {
            return Ok(Ack::default());
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_absolute() {
        let api = HttpApi::new(&DashboardConfig::for_origin("http://localhost:5000/"));
        assert_eq!(api.url(STATUS_PATH), "http://localhost:5000/api/status");
        assert_eq!(api.url(CONFIG_PATH), "http://localhost:5000/api/config");
    }

    #[test]
    fn test_ack_parsing() {
        let ack: Ack = serde_json::from_str(r#"{"status": "ok"}"#).expect("ack should parse");
        assert!(ack.is_ok());
        assert!(Ack::default().is_ok());

        let ack: Ack = serde_json::from_str(r#"{"status": "error"}"#).expect("ack should parse");
        assert!(!ack.is_ok());
    }
}
