//! Shared fixtures for the dashboard controller tests

#![allow(dead_code)]

use async_trait::async_trait;
use dhcp_lab_core::models::{
    AttackStatusMap, LogEntry, ReconResult, ScenarioData, ScenarioId, ScenarioResult,
    StartAttackRequest, StartAttackResponse,
};
use dhcp_lab_core::render::{ChartBackend, ChartId, ChartKind, ChartSpec, HeadlessCharts};
use dhcp_lab_core::{
    Dashboard, DashboardApi, DashboardConfig, DashboardView, PageLayout, Result, SharedView,
};
use mockall::mock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

mock! {
    pub Api {}

    #[async_trait]
    impl DashboardApi for Api {
        async fn simulate(&self, kind: &str) -> Result<ScenarioResult>;
        async fn scenario_data(&self, id: &ScenarioId) -> Result<ScenarioData>;
        async fn start_attack(&self, request: &StartAttackRequest) -> Result<StartAttackResponse>;
        async fn stop_attack(&self, kind: &str) -> Result<()>;
        async fn attack_status(&self) -> Result<AttackStatusMap>;
        async fn recon(&self, iface: &str) -> Result<ReconResult>;
    }
}

/// Chart backend that remembers which charts are alive
#[derive(Clone, Default)]
pub struct CountingCharts {
    inner: Arc<Mutex<CountingState>>,
}

#[derive(Default)]
struct CountingState {
    next_id: u64,
    live: HashMap<u64, ChartKind>,
    created: u64,
    destroyed: u64,
}

impl CountingCharts {
    pub fn live_in(&self, kind: ChartKind) -> usize {
        let state = self.inner.lock().unwrap();
        state.live.values().filter(|k| **k == kind).count()
    }

    pub fn live_total(&self) -> usize {
        self.inner.lock().unwrap().live.len()
    }

    pub fn created(&self) -> u64 {
        self.inner.lock().unwrap().created
    }

    pub fn destroyed(&self) -> u64 {
        self.inner.lock().unwrap().destroyed
    }
}

impl ChartBackend for CountingCharts {
    fn create(&mut self, slot: ChartKind, _spec: &ChartSpec) -> ChartId {
        let mut state = self.inner.lock().unwrap();
        state.next_id += 1;
        state.created += 1;
        let id = state.next_id;
        state.live.insert(id, slot);
        ChartId(id)
    }

    fn destroy(&mut self, id: ChartId) {
        let mut state = self.inner.lock().unwrap();
        assert!(
            state.live.remove(&id.0).is_some(),
            "destroyed a chart that was not alive"
        );
        state.destroyed += 1;
    }
}

pub fn log(timestamp: &str, message_type: &str, ip: Option<&str>, anomaly: bool) -> LogEntry {
    LogEntry {
        timestamp: timestamp.to_string(),
        message_type: message_type.to_string(),
        mac_address: "aa:bb".to_string(),
        ip_address: ip.map(String::from),
        details: "x".to_string(),
        is_anomaly: anomaly,
    }
}

pub fn sample_logs() -> Vec<LogEntry> {
    vec![
        log("2024-01-01T10:00:02.100Z", "DISCOVER", None, false),
        log("2024-01-01T10:00:01.000Z", "OFFER", Some("10.0.0.50"), false),
        log("2024-01-01T10:00:02.900Z", "DISCOVER", None, true),
        log("2024-01-01T10:00:01.500Z", "REQUEST", Some("10.0.0.50"), false),
        log("2024-01-01T10:00:03.000Z", "ACK", Some("10.0.0.50"), false),
    ]
}

pub fn shared_view(rows: &[&str]) -> SharedView {
    let layout = PageLayout::with_rows(rows.iter().copied());
    SharedView::new(DashboardView::bind(
        &layout,
        Box::<HeadlessCharts>::default(),
    ))
}

pub fn dashboard(api: MockApi, rows: &[&str]) -> Dashboard {
    dashboard_with(api, rows, DashboardConfig::default())
}

pub fn dashboard_with(api: MockApi, rows: &[&str], config: DashboardConfig) -> Dashboard {
    Dashboard::new(Arc::new(api), shared_view(rows), config)
}
