// Lab backend HTTP API
//
// The controller only talks to the backend through the DashboardApi trait so
// that dispatchers and the poller can run against any transport.

use crate::config::DashboardConfig;
use crate::models::{
    AttackStatusMap, ReconResult, ScenarioData, ScenarioId, ScenarioResult, StartAttackRequest,
    StartAttackResponse,
};
use crate::{LabError, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

/// Backend operations used by the dashboard
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// POST /api/simulate
    async fn simulate(&self, kind: &str) -> Result<ScenarioResult>;

    /// GET /api/scenario/{id}/data
    async fn scenario_data(&self, id: &ScenarioId) -> Result<ScenarioData>;

    /// POST /api/attack/start
    async fn start_attack(&self, request: &StartAttackRequest) -> Result<StartAttackResponse>;

    /// POST /api/attack/stop; the response body is not interpreted
    async fn stop_attack(&self, kind: &str) -> Result<()>;

    /// GET /api/attack/status
    async fn attack_status(&self) -> Result<AttackStatusMap>;

    /// POST /api/recon
    async fn recon(&self, iface: &str) -> Result<ReconResult>;
}

/// reqwest-backed implementation of [`DashboardApi`]
pub struct HttpDashboardApi {
    base_url: Url,
    http_client: reqwest::Client,
}

impl HttpDashboardApi {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            LabError::Config(format!("invalid base URL {}: {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(LabError::Config(format!(
                "base URL cannot carry a path: {}",
                config.base_url
            )));
        }

        let mut builder = reqwest::Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| LabError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join path segments onto the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                LabError::Config(format!("base URL cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder, path: &str) -> Result<reqwest::Response> {
        request.send().await.map_err(|e| {
            warn!(target: "api", path = %path, error = %e, "Backend request failed");
            if e.is_timeout() {
                LabError::Transport(format!("request to {} timed out", path))
            } else {
                LabError::Transport(e.to_string())
            }
        })
    }

    /// Decode a JSON body whatever the HTTP status; the lab backend reports
    /// refused actions as 4xx with a JSON explanation.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response, path: &str) -> Result<T> {
        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            warn!(target: "api", path = %path, error = %e, "Failed to read response body");
            LabError::Transport(e.to_string())
        })?;

        match serde_json::from_slice::<T>(&body) {
            Ok(value) => Ok(value),
            Err(e) if !status.is_success() => {
                warn!(target: "api", path = %path, status = %status, error = %e, "Backend returned error status");
                Err(LabError::HttpStatus {
                    status: status.as_u16(),
                })
            }
            Err(e) => {
                warn!(target: "api", path = %path, error = %e, "Failed to parse response");
                Err(LabError::Decode(format!("{}: {}", path, e)))
            }
        }
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &serde_json::Value,
    ) -> Result<T> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();
        debug!(target: "api", path = %path, "POST");
        let response = self
            .send(self.http_client.post(url).json(body), &path)
            .await?;
        Self::decode(response, &path).await
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();
        debug!(target: "api", path = %path, "GET");
        let response = self.send(self.http_client.get(url), &path).await?;
        Self::decode(response, &path).await
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn simulate(&self, kind: &str) -> Result<ScenarioResult> {
        self.post_json(&["api", "simulate"], &json!({ "type": kind }))
            .await
    }

    async fn scenario_data(&self, id: &ScenarioId) -> Result<ScenarioData> {
        self.get_json(&["api", "scenario", id.as_str(), "data"])
            .await
    }

    async fn start_attack(&self, request: &StartAttackRequest) -> Result<StartAttackResponse> {
        let body = serde_json::to_value(request)?;
        self.post_json(&["api", "attack", "start"], &body).await
    }

    async fn stop_attack(&self, kind: &str) -> Result<()> {
        let url = self.endpoint(&["api", "attack", "stop"])?;
        let path = url.path().to_string();
        let response = self
            .send(
                self.http_client.post(url).json(&json!({ "type": kind })),
                &path,
            )
            .await?;

        let status = response.status();
        match response.json::<StartAttackResponse>().await {
            Ok(body) => debug!(
                target: "api",
                attack = %kind,
                http_status = %status,
                status = %body.status,
                message = ?body.message,
                "Stop acknowledged"
            ),
            Err(_) => debug!(target: "api", attack = %kind, http_status = %status, "Stop sent"),
        }
        Ok(())
    }

    async fn attack_status(&self) -> Result<AttackStatusMap> {
        self.get_json(&["api", "attack", "status"]).await
    }

    async fn recon(&self, iface: &str) -> Result<ReconResult> {
        self.post_json(&["api", "recon"], &json!({ "iface": iface }))
            .await
    }
}
