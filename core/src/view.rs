// Bound dashboard view
//
// The page the controller drives, as plain data. A front end binds it once
// from a PageLayout and draws it; dispatchers and the poller mutate it through
// SharedView. Elements that may be absent (attack rows) are looked up
// explicitly and return Option.

use crate::render::{ChartBackend, RenderState};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

pub const START_LABEL: &str = "Start Attack";
pub const STARTING_LABEL: &str = "Starting...";
pub const STOP_LABEL: &str = "Stop Attack";

/// Which elements exist on the page being driven
#[derive(Clone, Debug, Default)]
pub struct PageLayout {
    /// Attack types that have a row (badge + start/stop controls)
    pub attack_rows: Vec<String>,
    /// Initial values of the form inputs
    pub inputs: FormInputs,
}

impl PageLayout {
    pub fn with_rows<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attack_rows: rows.into_iter().map(Into::into).collect(),
            inputs: FormInputs::default(),
        }
    }
}

/// Interface / target inputs shared by the attack and recon controls
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormInputs {
    pub iface: String,
    pub target_ip: String,
    pub rogue_server_ip: Option<String>,
    pub rogue_gateway: Option<String>,
    pub rogue_dns: Option<String>,
}

impl Default for FormInputs {
    fn default() -> Self {
        Self {
            iface: "eth0".to_string(),
            target_ip: String::new(),
            rogue_server_ip: None,
            rogue_gateway: None,
            rogue_dns: None,
        }
    }
}

/// A button-like control
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Control {
    pub visible: bool,
    pub enabled: bool,
    pub label: String,
}

impl Control {
    fn new(label: &str, visible: bool) -> Self {
        Self {
            visible,
            enabled: true,
            label: label.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusBadge {
    Stopped,
    Running,
}

impl StatusBadge {
    pub fn label(&self) -> &'static str {
        match self {
            StatusBadge::Stopped => "Stopped",
            StatusBadge::Running => "Running",
        }
    }
}

/// One controllable attack type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackRow {
    pub kind: String,
    pub badge: StatusBadge,
    pub start: Control,
    pub stop: Control,
}

impl AttackRow {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            badge: StatusBadge::Stopped,
            start: Control::new(START_LABEL, true),
            stop: Control::new(STOP_LABEL, false),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogLine {
    pub text: String,
    pub anomaly: bool,
}

/// Scrolling log container
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogView {
    pub lines: Vec<LogLine>,
    /// Index of the first line below the viewport top; equal to
    /// `scroll_height()` when pinned to the newest entry
    pub scroll_top: usize,
}

impl LogView {
    pub fn scroll_height(&self) -> usize {
        self.lines.len()
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.scroll_height();
    }

    pub fn is_at_bottom(&self) -> bool {
        self.scroll_top == self.scroll_height()
    }
}

/// Content of the recon result area
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ReconDisplay {
    #[default]
    Idle,
    Scanning,
    /// Error styling
    Failed(String),
    /// Warning styling
    Inconclusive(String),
    /// Success panel
    Found {
        server_ip: String,
        server_mac: String,
        offered_ip: String,
    },
    CommunicationError,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconPanel {
    pub trigger_enabled: bool,
    pub spinner_visible: bool,
    pub display: ReconDisplay,
}

impl Default for ReconPanel {
    fn default() -> Self {
        Self {
            trigger_enabled: true,
            spinner_visible: false,
            display: ReconDisplay::Idle,
        }
    }
}

/// Whole dashboard page state
pub struct DashboardView {
    pub status_text: String,
    pub charts: RenderState,
    pub log: LogView,
    pub inputs: FormInputs,
    pub recon: ReconPanel,
    /// Wall-clock time of the last successful status reconciliation
    pub last_poll: Option<DateTime<Utc>>,
    rows: BTreeMap<String, AttackRow>,
    alerts: VecDeque<String>,
}

impl DashboardView {
    /// Resolve the page elements once
    pub fn bind(layout: &PageLayout, chart_backend: Box<dyn ChartBackend>) -> Self {
        let rows = layout
            .attack_rows
            .iter()
            .filter(|kind| !kind.is_empty())
            .map(|kind| (kind.clone(), AttackRow::new(kind.clone())))
            .collect();

        Self {
            status_text: String::new(),
            charts: RenderState::new(chart_backend),
            log: LogView::default(),
            inputs: layout.inputs.clone(),
            recon: ReconPanel::default(),
            last_poll: None,
            rows,
            alerts: VecDeque::new(),
        }
    }

    pub fn row(&self, kind: &str) -> Option<&AttackRow> {
        self.rows.get(kind)
    }

    pub fn row_mut(&mut self, kind: &str) -> Option<&mut AttackRow> {
        self.rows.get_mut(kind)
    }

    pub fn rows(&self) -> impl Iterator<Item = &AttackRow> {
        self.rows.values()
    }

    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Queue an interruptive notification for the front end
    pub fn push_alert(&mut self, message: impl Into<String>) {
        self.alerts.push_back(message.into());
    }

    pub fn pending_alerts(&self) -> impl Iterator<Item = &str> {
        self.alerts.iter().map(String::as_str)
    }

    pub fn drain_alerts(&mut self) -> Vec<String> {
        self.alerts.drain(..).collect()
    }
}

/// Handle to the single view shared by dispatchers, the poller and the front end.
///
/// Mutations go through [`SharedView::update`], which never spans an await, and
/// bump a revision counter that front ends can watch to redraw.
#[derive(Clone)]
pub struct SharedView {
    inner: Arc<Mutex<DashboardView>>,
    revision: Arc<watch::Sender<u64>>,
}

impl SharedView {
    pub fn new(view: DashboardView) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Mutex::new(view)),
            revision: Arc::new(revision),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DashboardView> {
        // Plain data, so a poisoned lock is still usable
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut DashboardView) -> R) -> R {
        let out = {
            let mut view = self.lock();
            f(&mut view)
        };
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
        out
    }

    pub fn read<R>(&self, f: impl FnOnce(&DashboardView) -> R) -> R {
        let view = self.lock();
        f(&view)
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}
