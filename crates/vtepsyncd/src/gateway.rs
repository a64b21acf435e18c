//! Device command gateway.
//!
//! [`DeviceGateway`] is the seam between the reconciler and the switch: it
//! runs a batch of CLI commands and returns one JSON result per command.
//! [`EapiClient`] implements it over the switch command API (JSON-RPC
//! `runCmds` over HTTPS with basic authentication).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::GatewayError;

/// Output rendering requested from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Structured JSON per command.
    Json,
    /// CLI text wrapped as `{"output": "..."}` per command.
    Text,
}

/// A batch of commands executed in one privileged session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub cmds: Vec<String>,
    pub format: ResponseFormat,
}

impl CommandRequest {
    pub fn new(cmds: Vec<String>, format: ResponseFormat) -> Self {
        Self { cmds, format }
    }
}

/// Runs commands on a network device.
#[async_trait]
pub trait DeviceGateway: Send + Sync {
    /// Executes `request` and returns one result per command, in order.
    async fn run_commands(&self, request: &CommandRequest) -> Result<Vec<Value>, GatewayError>;
}

/// Connection settings for [`EapiClient`].
#[derive(Clone)]
pub struct EapiConfig {
    /// Command API endpoint, e.g. `https://127.0.0.1/command-api`.
    pub url: String,
    pub username: String,
    pub password: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Accept self-signed device certificates.
    pub accept_invalid_certs: bool,
}

impl fmt::Debug for EapiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EapiConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: RunCmdsParams<'a>,
    id: String,
}

#[derive(Debug, Serialize)]
struct RunCmdsParams<'a> {
    version: u32,
    cmds: &'a [String],
    format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Vec<Value>>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Command API client.
#[derive(Debug)]
pub struct EapiClient {
    http: reqwest::Client,
    config: EapiConfig,
    next_id: AtomicU64,
}

impl EapiClient {
    /// Create a client; no connection is made until the first request.
    pub fn new(config: EapiConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| GatewayError::Transport {
                endpoint: config.url.clone(),
                message: e.to_string(),
                is_timeout: false,
            })?;

        Ok(Self {
            http,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        GatewayError::Transport {
            endpoint: self.config.url.clone(),
            message: err.to_string(),
            is_timeout: err.is_timeout(),
        }
    }
}

#[async_trait]
impl DeviceGateway for EapiClient {
    async fn run_commands(&self, request: &CommandRequest) -> Result<Vec<Value>, GatewayError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: "2.0",
            method: "runCmds",
            params: RunCmdsParams {
                version: 1,
                cmds: &request.cmds,
                format: request.format,
            },
            id: format!("vtepsyncd-{}", id),
        };

        tracing::debug!(endpoint = %self.config.url, cmds = ?request.cmds, "Sending runCmds");

        let response = self
            .http
            .post(&self.config.url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                endpoint: self.config.url.clone(),
                status: status.as_u16(),
            });
        }

        let rpc: RpcResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::malformed(e.to_string()))?;

        if let Some(err) = rpc.error {
            return Err(GatewayError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        let results = rpc
            .result
            .ok_or_else(|| GatewayError::malformed("response has neither result nor error"))?;

        if results.len() != request.cmds.len() {
            return Err(GatewayError::malformed(format!(
                "expected {} results, got {}",
                request.cmds.len(),
                results.len()
            )));
        }

        Ok(results)
    }
}
