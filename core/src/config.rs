// Controller configuration
//
// Defaults follow the lab web page (2 s polling, no timeout); every field can
// be overridden from the environment (DHCP_LAB_*) or by a front end overlay.

use crate::{LabError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// What to do when loading a scenario's logs fails
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioLoadPolicy {
    /// Write the failure into the status text
    #[default]
    Surface,
    /// Log only; the view keeps its previous content
    Silent,
}

impl FromStr for ScenarioLoadPolicy {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "surface" => Ok(Self::Surface),
            "silent" => Ok(Self::Silent),
            other => Err(LabError::Config(format!(
                "unknown scenario load policy: {}",
                other
            ))),
        }
    }
}

/// Ordering of the traffic chart's time buckets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketOrder {
    /// Order in which each bucket is first seen in the log sequence
    #[default]
    FirstAppearance,
    /// Sorted by time of day
    Chronological,
}

impl FromStr for BucketOrder {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first_appearance" => Ok(Self::FirstAppearance),
            "chronological" => Ok(Self::Chronological),
            other => Err(LabError::Config(format!("unknown bucket order: {}", other))),
        }
    }
}

/// Dashboard controller configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Base URL of the lab backend (scheme, host, port)
    pub base_url: String,
    /// Status poll period in milliseconds
    pub poll_interval_ms: u64,
    /// Per-request timeout; None waits forever
    pub request_timeout_ms: Option<u64>,
    pub user_agent: String,
    pub scenario_load_failure: ScenarioLoadPolicy,
    pub bucket_order: BucketOrder,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            poll_interval_ms: 2_000,
            request_timeout_ms: None,
            user_agent: "dhcp-lab-dashboard/0.1".to_string(),
            scenario_load_failure: ScenarioLoadPolicy::default(),
            bucket_order: BucketOrder::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            base_url: std::env::var("DHCP_LAB_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(default.base_url),
            poll_interval_ms: std::env::var("DHCP_LAB_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default.poll_interval_ms),
            request_timeout_ms: std::env::var("DHCP_LAB_REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
                .or(default.request_timeout_ms),
            user_agent: std::env::var("DHCP_LAB_USER_AGENT").unwrap_or(default.user_agent),
            scenario_load_failure: std::env::var("DHCP_LAB_SCENARIO_LOAD_FAILURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.scenario_load_failure),
            bucket_order: std::env::var("DHCP_LAB_BUCKET_ORDER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.bucket_order),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_poll_every_two_seconds() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.poll_interval(), Duration::from_secs(2));
        assert!(cfg.request_timeout().is_none());
        assert_eq!(cfg.scenario_load_failure, ScenarioLoadPolicy::Surface);
        assert_eq!(cfg.bucket_order, BucketOrder::FirstAppearance);
    }

    #[test]
    fn policies_parse_case_insensitively() {
        assert_eq!(
            "Silent".parse::<ScenarioLoadPolicy>().unwrap(),
            ScenarioLoadPolicy::Silent
        );
        assert_eq!(
            "chronological".parse::<BucketOrder>().unwrap(),
            BucketOrder::Chronological
        );
        assert!("sometimes".parse::<BucketOrder>().is_err());
    }
}
