use std::fs;
use std::path::Path;

use dhcp_lab_core::config::{BucketOrder, ScenarioLoadPolicy};
use dhcp_lab_core::models::KNOWN_ATTACKS;
use dhcp_lab_core::view::FormInputs;
use dhcp_lab_core::{DashboardConfig, PageLayout};

/// Configuration of the lab console
#[derive(Clone, Debug)]
pub struct ConsoleConfig {
    pub backend: DashboardConfig,
    pub page: PageConfig,
}

/// Which rows the console shows and what the form inputs start with
#[derive(Clone, Debug)]
pub struct PageConfig {
    pub attack_rows: Vec<String>,
    pub inputs: FormInputs,
    /// Width of the widest chart bar, in characters
    pub chart_width: usize,
}

impl Default for PageConfig {
    fn default() -> Self {
        let mut inputs = FormInputs::default();
        if let Some(iface) = std::env::var("DHCP_LAB_IFACE").ok().filter(|s| !s.is_empty()) {
            inputs.iface = iface;
        }
        if let Ok(target) = std::env::var("DHCP_LAB_TARGET_IP") {
            inputs.target_ip = target;
        }

        Self {
            attack_rows: KNOWN_ATTACKS.iter().map(|s| s.to_string()).collect(),
            inputs,
            chart_width: 40,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            backend: DashboardConfig::from_env(),
            page: PageConfig::default(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from a TOML file (path via DHCP_LAB_CONFIG or ./lab_console.toml),
    /// overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let default = Self::default();
        let path =
            std::env::var("DHCP_LAB_CONFIG").unwrap_or_else(|_| "lab_console.toml".into());
        let p = Path::new(&path);
        if !p.exists() {
            tracing::info!(target: "lab_console", path = %path, "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(p) {
            Ok(s) => match Self::from_toml_str(&s, default.clone()) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!(target: "lab_console", error = %e, "Failed to parse TOML; using defaults");
                    default
                }
            },
            Err(e) => {
                tracing::warn!(target: "lab_console", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }

    pub fn from_toml_str(s: &str, base: Self) -> Result<Self, toml::de::Error> {
        let t: ConsoleToml = toml::from_str(s)?;
        Ok(t.overlay(base))
    }

    pub fn layout(&self) -> PageLayout {
        PageLayout {
            attack_rows: self.page.attack_rows.clone(),
            inputs: self.page.inputs.clone(),
        }
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct ConsoleToml {
    pub backend: Option<BackendToml>,
    pub page: Option<PageToml>,
}

impl ConsoleToml {
    fn overlay(self, mut base: ConsoleConfig) -> ConsoleConfig {
        if let Some(b) = self.backend {
            b.apply(&mut base.backend);
        }
        if let Some(p) = self.page {
            p.apply(&mut base.page);
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct BackendToml {
    pub base_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
    pub scenario_load_failure: Option<ScenarioLoadPolicy>,
    pub bucket_order: Option<BucketOrder>,
}
impl BackendToml {
    fn apply(self, b: &mut DashboardConfig) {
        if let Some(x) = self.base_url {
            b.base_url = x;
        }
        if let Some(x) = self.poll_interval_ms {
            b.poll_interval_ms = x.max(1);
        }
        if let Some(x) = self.request_timeout_ms {
            // 0 turns the timeout off
            b.request_timeout_ms = Some(x).filter(|ms| *ms > 0);
        }
        if let Some(x) = self.user_agent {
            b.user_agent = x;
        }
        if let Some(x) = self.scenario_load_failure {
            b.scenario_load_failure = x;
        }
        if let Some(x) = self.bucket_order {
            b.bucket_order = x;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct PageToml {
    pub attack_rows: Option<Vec<String>>,
    pub iface: Option<String>,
    pub target_ip: Option<String>,
    pub rogue_server_ip: Option<String>,
    pub rogue_gateway: Option<String>,
    pub rogue_dns: Option<String>,
    pub chart_width: Option<usize>,
}
impl PageToml {
    fn apply(self, p: &mut PageConfig) {
        if let Some(x) = self.attack_rows {
            p.attack_rows = x.into_iter().filter(|s| !s.is_empty()).collect();
        }
        if let Some(x) = self.iface {
            p.inputs.iface = x;
        }
        if let Some(x) = self.target_ip {
            p.inputs.target_ip = x;
        }
        if let Some(x) = self.rogue_server_ip {
            p.inputs.rogue_server_ip = Some(x);
        }
        if let Some(x) = self.rogue_gateway {
            p.inputs.rogue_gateway = Some(x);
        }
        if let Some(x) = self.rogue_dns {
            p.inputs.rogue_dns = Some(x);
        }
        if let Some(x) = self.chart_width {
            p.chart_width = x.clamp(10, 200);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ConsoleConfig {
        ConsoleConfig {
            backend: DashboardConfig::default(),
            page: PageConfig {
                attack_rows: vec!["starvation".into()],
                inputs: FormInputs::default(),
                chart_width: 40,
            },
        }
    }

    #[test]
    fn overlay_replaces_only_given_fields() {
        let cfg = ConsoleConfig::from_toml_str(
            r#"
            [backend]
            base_url = "http://10.0.0.2:5000"
            bucket_order = "chronological"

            [page]
            iface = "wlan0"
            attack_rows = ["starvation", "nak", ""]
            rogue_dns = "8.8.8.8"
            "#,
            base(),
        )
        .unwrap();

        assert_eq!(cfg.backend.base_url, "http://10.0.0.2:5000");
        assert_eq!(cfg.backend.bucket_order, BucketOrder::Chronological);
        assert_eq!(cfg.backend.poll_interval_ms, 2_000);
        assert_eq!(cfg.page.inputs.iface, "wlan0");
        assert_eq!(cfg.page.attack_rows, vec!["starvation", "nak"]);
        assert_eq!(cfg.page.inputs.rogue_dns.as_deref(), Some("8.8.8.8"));
        assert!(cfg.page.inputs.rogue_gateway.is_none());
    }

    #[test]
    fn zero_timeout_disables_it() {
        let cfg = ConsoleConfig::from_toml_str(
            "[backend]\nrequest_timeout_ms = 0\nscenario_load_failure = \"silent\"\n",
            base(),
        )
        .unwrap();
        assert!(cfg.backend.request_timeout_ms.is_none());
        assert_eq!(
            cfg.backend.scenario_load_failure,
            ScenarioLoadPolicy::Silent
        );
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(ConsoleConfig::from_toml_str("[backend\n", base()).is_err());
    }
}
