//! Monitoring API HTTP client.
//!
//! Synchronous client (via `ureq`) for the four collaborator endpoints:
//!
//! - `GET  /api/status` — raw terminal-status records
//! - `GET  /api/logs/{branch}` — execution log for one branch (404 = none)
//! - `GET  /api/config` / `POST /api/config` — remote pipeline config
//! - `POST /api/comando/{branch}` — trigger a run, result echoed verbatim
//!
//! Failures split into the two classes callers care about: the network/HTTP
//! layer failed, or the payload arrived but could not be understood. Only
//! the status fetch is ever retried automatically (by the controller); the
//! other endpoints report their error once.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::config::VigiaConfig;
use crate::model::RawStatusRecord;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// What went wrong talking to the monitoring API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure or non-2xx response.
    #[error("falha de rede: {0}")]
    Network(String),
    /// The response arrived but was not usable (bad JSON, empty payload).
    #[error("resposta inválida: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One entry from `GET /api/logs/{branch}`.
#[derive(Debug, Clone, Deserialize)]
pub struct LogEntry {
    #[serde(default, alias = "timestamp")]
    pub data_execucao: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, alias = "detail")]
    pub detalhe: String,
}

/// Reply from `POST /api/config`.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveReply {
    #[serde(default)]
    pub msg: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous monitoring API client.
///
/// Created from the resolved config and reused for the lifetime of a single
/// invocation (or watch loop). At most one request is in flight at a time,
/// so responses can never arrive out of order.
#[derive(Debug)]
pub struct MonitorClient {
    base_url: String,
    timeout: Duration,
}

impl MonitorClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &VigiaConfig) -> Self {
        Self {
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.api.timeout_ms),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch every terminal-status record.
    pub fn fetch_status(&self) -> Result<Vec<RawStatusRecord>, FetchError> {
        let resp = ureq::get(&self.url("/api/status"))
            .timeout(self.timeout)
            .call()
            .map_err(network_error)?;

        let body = resp
            .into_string()
            .map_err(|e| FetchError::Malformed(e.to_string()))?;
        decode_status(&body)
    }

    /// Fetch the execution log for one branch. 404 means "no logs yet" and
    /// comes back as an empty vec, not an error.
    pub fn fetch_logs(&self, branch_code: &str) -> Result<Vec<LogEntry>, FetchError> {
        let url = self.url(&format!("/api/logs/{branch_code}"));
        match ureq::get(&url).timeout(self.timeout).call() {
            Ok(resp) => resp
                .into_json()
                .map_err(|e| FetchError::Malformed(e.to_string())),
            Err(ureq::Error::Status(404, _)) => Ok(Vec::new()),
            Err(e) => Err(network_error(e)),
        }
    }

    /// Fetch the remote pipeline configuration as arbitrary JSON.
    pub fn fetch_config(&self) -> Result<serde_json::Value, FetchError> {
        let resp = ureq::get(&self.url("/api/config"))
            .timeout(self.timeout)
            .call()
            .map_err(network_error)?;
        resp.into_json()
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }

    /// Replace the remote pipeline configuration.
    pub fn save_config(&self, config: &serde_json::Value) -> Result<SaveReply, FetchError> {
        let resp = ureq::post(&self.url("/api/config"))
            .timeout(self.timeout)
            .send_json(config)
            .map_err(network_error)?;
        resp.into_json()
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }

    /// Trigger an on-demand run for one branch; the API's JSON reply is
    /// returned verbatim for display.
    pub fn send_command(&self, branch_code: &str) -> Result<serde_json::Value, FetchError> {
        // Body-less POST — the branch code in the path is the whole request.
        let url = self.url(&format!("/api/comando/{branch_code}"));
        let resp = ureq::post(&url)
            .timeout(self.timeout)
            .call()
            .map_err(network_error)?;
        resp.into_json()
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }

    /// Quick reachability probe for `vigia health`.
    pub fn is_reachable(&self) -> bool {
        ureq::get(&self.url("/api/status"))
            .timeout(Duration::from_secs(5))
            .call()
            .is_ok()
    }

    /// Base URL for display.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Decode a `/api/status` body into raw records.
///
/// An empty array counts as malformed: the API always knows at least one
/// terminal, so an empty payload means the collector upstream is broken.
fn decode_status(body: &str) -> Result<Vec<RawStatusRecord>, FetchError> {
    let records: Vec<RawStatusRecord> =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if records.is_empty() {
        return Err(FetchError::Malformed("payload de status vazio".to_string()));
    }
    Ok(records)
}

/// Both transport errors and non-2xx statuses are network failures to the
/// caller.
fn network_error(e: ureq::Error) -> FetchError {
    match e {
        ureq::Error::Status(code, _) => FetchError::Network(format!("HTTP {code}")),
        ureq::Error::Transport(t) => FetchError::Network(t.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
