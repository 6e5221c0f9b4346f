// DHCP Lab Core Library
// Dashboard controller for the DHCP attack lab backend

pub mod api;
pub mod config;
pub mod dispatch;
pub mod models;
pub mod poller;
pub mod reconcile;
pub mod render;
pub mod view;

pub use api::{DashboardApi, HttpDashboardApi};
pub use config::{BucketOrder, DashboardConfig, ScenarioLoadPolicy};
pub use dispatch::Dashboard;
pub use models::{
    AttackStatusMap, LogEntry, ReconResult, ScenarioData, ScenarioId, ScenarioResult,
    StartAttackRequest, StartAttackResponse,
};
pub use poller::{PollHandle, PollerState, StatusPoller};
pub use render::{ChartBackend, ChartKind, ChartSpec, RenderState};
pub use view::{DashboardView, PageLayout, SharedView};

// Error types
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LabError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Backend returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for LabError {
    fn from(e: serde_json::Error) -> Self {
        LabError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LabError>;
