// Action dispatchers
//
// Each user action sends one request to the backend and folds the outcome
// into the shared view. Failures stay local to the action that hit them:
// nothing here returns an error that could take the dashboard down.

use crate::api::DashboardApi;
use crate::config::{DashboardConfig, ScenarioLoadPolicy};
use crate::models::{ReconResult, ScenarioId, StartAttackRequest};
use crate::poller;
use crate::render::{render_charts, render_logs};
use crate::view::{ReconDisplay, SharedView, STARTING_LABEL, START_LABEL};
use crate::{LabError, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// The dashboard controller: backend handle, bound view and settings
#[derive(Clone)]
pub struct Dashboard {
    api: Arc<dyn DashboardApi>,
    view: SharedView,
    config: Arc<DashboardConfig>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn DashboardApi>, view: SharedView, config: DashboardConfig) -> Self {
        Self {
            api,
            view,
            config: Arc::new(config),
        }
    }

    pub fn view(&self) -> &SharedView {
        &self.view
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub(crate) fn api(&self) -> &dyn DashboardApi {
        self.api.as_ref()
    }

    fn set_status(&self, text: String) {
        self.view.update(|v| v.status_text = text);
    }

    /// Run a simulation and, on success, load and render its logs
    pub async fn run_simulation(&self, kind: &str) {
        if kind.trim().is_empty() {
            self.set_status("Error: simulation type must not be empty".to_string());
            return;
        }

        info!(target: "dispatch", simulation = %kind, "Running simulation");
        self.set_status(format!("Running {} simulation...", kind));

        let result = match self.api.simulate(kind).await {
            Ok(result) => result,
            Err(e) => {
                warn!(target: "dispatch", simulation = %kind, error = %e, "Simulation request failed");
                self.set_status(format!("Error: {}", e));
                return;
            }
        };

        if let Some(reason) = result.error() {
            self.set_status(format!("Error: {}", reason));
            return;
        }

        let Some(scenario_id) = result.scenario_id else {
            let e = LabError::InvalidResponse("simulation response has no scenario_id".into());
            self.set_status(format!("Error: {}", e));
            return;
        };

        self.set_status(format!(
            "Simulation complete (ID: {}). Loading data...",
            scenario_id
        ));

        if let Err(e) = self.load_scenario_data(&scenario_id).await {
            debug!(target: "dispatch", scenario = %scenario_id, error = %e, "Simulation finished without data");
        }
    }

    /// Fetch a scenario's logs and feed them to both renderers
    pub async fn load_scenario_data(&self, scenario_id: &ScenarioId) -> Result<usize> {
        let data = match self.api.scenario_data(scenario_id).await {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    target: "dispatch",
                    scenario = %scenario_id,
                    error = %e,
                    "Failed to load scenario data"
                );
                if self.config.scenario_load_failure == ScenarioLoadPolicy::Surface {
                    self.set_status(format!(
                        "Error loading scenario {}: {}",
                        scenario_id, e
                    ));
                }
                return Err(e);
            }
        };

        let order = self.config.bucket_order;
        let count = data.logs.len();
        self.view.update(|v| {
            render_charts(&mut v.charts, &data.logs, order);
            render_logs(&mut v.log, &data.logs);
        });
        info!(target: "dispatch", scenario = %scenario_id, entries = count, "Scenario rendered");
        Ok(count)
    }

    /// Start `kind` using the interface/target currently in the form inputs
    pub async fn start_attack(&self, kind: &str) {
        let request = self.view.read(|v| StartAttackRequest {
            kind: kind.to_string(),
            iface: v.inputs.iface.clone(),
            target_ip: v.inputs.target_ip.clone(),
            rogue_server_ip: v.inputs.rogue_server_ip.clone(),
            rogue_gateway: v.inputs.rogue_gateway.clone(),
            rogue_dns: v.inputs.rogue_dns.clone(),
        });
        self.start_attack_with(request).await;
    }

    pub async fn start_attack_with(&self, request: StartAttackRequest) {
        let kind = request.kind.clone();
        let accepted = self.view.update(|v| match v.row_mut(&kind) {
            Some(row) if !(row.start.enabled && row.start.visible) => false,
            Some(row) => {
                row.start.enabled = false;
                row.start.label = STARTING_LABEL.to_string();
                true
            }
            None => true,
        });
        if !accepted {
            debug!(target: "dispatch", attack = %kind, "Start control inactive; request not sent");
            return;
        }

        info!(
            target: "dispatch",
            attack = %kind,
            iface = %request.iface,
            target_ip = %request.target_ip,
            "Starting attack"
        );

        match self.api.start_attack(&request).await {
            Ok(response) if response.is_started() => {
                info!(target: "dispatch", attack = %kind, "Attack started");
                self.refresh_status().await;
            }
            Ok(response) => {
                let message = response.message.unwrap_or(response.status);
                warn!(target: "dispatch", attack = %kind, message = %message, "Backend refused attack");
                self.fail_start(&kind, format!("Error: {}", message));
            }
            Err(e) => {
                error!(target: "dispatch", attack = %kind, error = %e, "Start request failed");
                self.fail_start(&kind, format!("Network Error: {}", e));
            }
        }
    }

    fn fail_start(&self, kind: &str, alert: String) {
        self.view.update(|v| {
            v.push_alert(alert);
            if let Some(row) = v.row_mut(kind) {
                row.start.enabled = true;
                row.start.label = START_LABEL.to_string();
            }
        });
    }

    /// Stop `kind`; transport failures are logged only
    pub async fn stop_attack(&self, kind: &str) {
        info!(target: "dispatch", attack = %kind, "Stopping attack");
        if let Err(e) = self.api.stop_attack(kind).await {
            error!(target: "dispatch", attack = %kind, error = %e, "Stop request failed");
        }
        self.refresh_status().await;
    }

    /// Out-of-band status reconciliation; failures are logged only
    pub async fn refresh_status(&self) {
        if let Err(e) = poller::poll_status_once(self).await {
            warn!(target: "dispatch", error = %e, "Status refresh failed");
        }
    }

    /// Scan for DHCP servers on the interface currently in the form inputs
    pub async fn run_recon(&self) {
        let iface = self.view.read(|v| v.inputs.iface.clone());
        self.run_recon_on(&iface).await;
    }

    pub async fn run_recon_on(&self, iface: &str) {
        let Some(_busy) = ReconBusy::acquire(&self.view) else {
            debug!(target: "dispatch", iface = %iface, "Recon already running; request not sent");
            return;
        };
        info!(target: "dispatch", iface = %iface, "Running recon");

        let display = match self.api.recon(iface).await {
            Ok(ReconResult::Failed { error }) => ReconDisplay::Failed(error),
            Ok(ReconResult::Inconclusive { result }) => ReconDisplay::Inconclusive(result),
            Ok(ReconResult::Found {
                server_ip,
                server_mac,
                offered_ip,
            }) => {
                info!(
                    target: "dispatch",
                    server_ip = %server_ip,
                    server_mac = %server_mac,
                    offered_ip = %offered_ip,
                    "DHCP server found"
                );
                ReconDisplay::Found {
                    server_ip,
                    server_mac,
                    offered_ip,
                }
            }
            Err(e) => {
                warn!(target: "dispatch", iface = %iface, error = %e, "Recon request failed");
                ReconDisplay::CommunicationError
            }
        };

        self.view.update(|v| v.recon.display = display);
    }
}

/// Busy state of the recon panel for the lifetime of one request. Released on
/// drop, so a cancelled request also clears the spinner. Only one request
/// holds it at a time.
struct ReconBusy {
    view: SharedView,
}

impl ReconBusy {
    /// `None` while another request holds the panel
    fn acquire(view: &SharedView) -> Option<Self> {
        let acquired = view.update(|v| {
            if !v.recon.trigger_enabled {
                return false;
            }
            v.recon.trigger_enabled = false;
            v.recon.spinner_visible = true;
            v.recon.display = ReconDisplay::Scanning;
            true
        });
        acquired.then(|| Self { view: view.clone() })
    }
}

impl Drop for ReconBusy {
    fn drop(&mut self) {
        self.view.update(|v| {
            v.recon.trigger_enabled = true;
            v.recon.spinner_visible = false;
        });
    }
}
