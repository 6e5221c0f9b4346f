// Wire types exchanged with the lab backend
//
// Every type here mirrors one JSON shape of the /api endpoints. Responses are
// immutable snapshots; nothing in the controller edits them after decoding.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Attack types the lab backend knows how to run
pub const KNOWN_ATTACKS: [&str; 5] = ["starvation", "nak", "release", "flood", "decline"];

/// One captured packet/event of a simulated scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO-8601 timestamp, as produced by the backend
    pub timestamp: String,
    pub message_type: String,
    pub mac_address: String,
    pub ip_address: Option<String>,
    pub details: String,
    pub is_anomaly: bool,
}

impl LogEntry {
    /// IP address, treating an empty string the same as a missing one
    pub fn ip(&self) -> Option<&str> {
        self.ip_address.as_deref().filter(|ip| !ip.is_empty())
    }
}

/// Opaque scenario identifier; the backend may send it as a string or a number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawScenarioId")]
pub struct ScenarioId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScenarioId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<RawScenarioId> for ScenarioId {
    fn from(raw: RawScenarioId) -> Self {
        match raw {
            RawScenarioId::Text(s) => ScenarioId(s),
            RawScenarioId::Signed(n) => ScenarioId(n.to_string()),
            RawScenarioId::Unsigned(n) => ScenarioId(n.to_string()),
        }
    }
}

impl ScenarioId {
    pub fn new(id: impl Into<String>) -> Self {
        ScenarioId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Response of POST /api/simulate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    #[serde(default)]
    pub scenario_id: Option<ScenarioId>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ScenarioResult {
    /// Backend-reported error, ignoring empty strings
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

/// Response of GET /api/scenario/{id}/data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioData {
    pub logs: Vec<LogEntry>,
}

/// Attack type -> "is running", as returned by GET /api/attack/status
pub type AttackStatusMap = HashMap<String, bool>;

/// Body of POST /api/attack/start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartAttackRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub iface: String,
    pub target_ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rogue_server_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rogue_gateway: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rogue_dns: Option<String>,
}

/// Response of POST /api/attack/start (and /stop)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartAttackResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl StartAttackResponse {
    pub const STARTED: &'static str = "started";

    pub fn is_started(&self) -> bool {
        self.status == Self::STARTED
    }
}

/// Three-way outcome of POST /api/recon
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawReconResult")]
pub enum ReconResult {
    /// The scan itself failed on the backend
    Failed { error: String },
    /// Inconclusive scan, e.g. nobody answered before the timeout
    Inconclusive { result: String },
    /// A DHCP server answered the discover
    Found {
        server_ip: String,
        server_mac: String,
        offered_ip: String,
    },
}

#[derive(Deserialize)]
struct RawReconResult {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    server_ip: Option<String>,
    #[serde(default)]
    server_mac: Option<String>,
    #[serde(default)]
    offered_ip: Option<String>,
}

impl TryFrom<RawReconResult> for ReconResult {
    type Error = String;

    fn try_from(raw: RawReconResult) -> std::result::Result<Self, String> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());

        if let Some(error) = non_empty(raw.error) {
            return Ok(ReconResult::Failed { error });
        }
        if let Some(result) = non_empty(raw.result) {
            return Ok(ReconResult::Inconclusive { result });
        }
        match (raw.server_ip, raw.server_mac, raw.offered_ip) {
            (Some(server_ip), Some(server_mac), Some(offered_ip)) => Ok(ReconResult::Found {
                server_ip,
                server_mac,
                offered_ip,
            }),
            _ => Err("recon response has neither error, result nor server fields".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scenario_id_accepts_numbers_and_strings() {
        let a: ScenarioResult = serde_json::from_value(json!({"scenario_id": 42})).unwrap();
        let b: ScenarioResult = serde_json::from_value(json!({"scenario_id": "abc123"})).unwrap();
        assert_eq!(a.scenario_id.unwrap().as_str(), "42");
        assert_eq!(b.scenario_id.unwrap().to_string(), "abc123");
    }

    #[test]
    fn empty_error_is_not_an_error() {
        let r: ScenarioResult =
            serde_json::from_value(json!({"scenario_id": "x", "error": ""})).unwrap();
        assert!(r.error().is_none());
    }

    #[test]
    fn recon_prefers_error_then_result() {
        let r: ReconResult =
            serde_json::from_value(json!({"error": "no iface", "result": "ignored"})).unwrap();
        assert_eq!(
            r,
            ReconResult::Failed {
                error: "no iface".into()
            }
        );

        let r: ReconResult =
            serde_json::from_value(json!({"result": "No DHCP Server found or timed out"}))
                .unwrap();
        assert!(matches!(r, ReconResult::Inconclusive { .. }));
    }

    #[test]
    fn recon_found_needs_all_fields() {
        let r: ReconResult = serde_json::from_value(json!({
            "server_ip": "10.0.0.1",
            "server_mac": "aa:bb:cc:dd:ee:ff",
            "offered_ip": "10.0.0.50"
        }))
        .unwrap();
        assert!(matches!(r, ReconResult::Found { .. }));

        let partial = serde_json::from_value::<ReconResult>(json!({"server_ip": "10.0.0.1"}));
        assert!(partial.is_err());
    }

    #[test]
    fn start_request_omits_unset_rogue_options() {
        let req = StartAttackRequest {
            kind: "starvation".into(),
            iface: "eth0".into(),
            target_ip: String::new(),
            ..Default::default()
        };
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["type"], "starvation");
        assert!(body.get("rogue_dns").is_none());
    }
}
