// Terminal drawing of the dashboard view
//
// TextChartBackend draws charts as rows of bars onto a shared ChartCanvas;
// render_screen lays out the status line, attack rows, recon panel, charts
// and the tail of the log view.

use dhcp_lab_core::render::{ChartBackend, ChartId, ChartKind, ChartSpec};
use dhcp_lab_core::view::{DashboardView, ReconDisplay};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

const LOG_TAIL: usize = 12;

/// Text drawn for each live chart
#[derive(Clone, Default)]
pub struct ChartCanvas {
    inner: Arc<Mutex<CanvasState>>,
}

#[derive(Default)]
struct CanvasState {
    next_id: u64,
    charts: HashMap<u64, (ChartKind, String)>,
}

impl ChartCanvas {
    fn state(&self) -> std::sync::MutexGuard<'_, CanvasState> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Text of the chart currently shown in `kind`
    pub fn drawn(&self, kind: ChartKind) -> Option<String> {
        self.state()
            .charts
            .values()
            .find(|(k, _)| *k == kind)
            .map(|(_, text)| text.clone())
    }

    #[cfg(test)]
    pub fn live_charts(&self) -> usize {
        self.state().charts.len()
    }
}

pub struct TextChartBackend {
    canvas: ChartCanvas,
    width: usize,
}

impl TextChartBackend {
    pub fn new(canvas: ChartCanvas, width: usize) -> Self {
        Self {
            canvas,
            width: width.max(1),
        }
    }
}

impl ChartBackend for TextChartBackend {
    fn create(&mut self, slot: ChartKind, spec: &ChartSpec) -> ChartId {
        let text = draw_bars(spec, self.width);
        let mut state = self.canvas.state();
        state.next_id += 1;
        let id = state.next_id;
        state.charts.insert(id, (slot, text));
        ChartId(id)
    }

    fn destroy(&mut self, id: ChartId) {
        self.canvas.state().charts.remove(&id.0);
    }
}

fn draw_bars(spec: &ChartSpec, width: usize) -> String {
    let labels = spec.labels();
    let values = spec.values();
    let max = values.iter().copied().max().unwrap_or(0).max(1);
    let label_width = labels.iter().map(|l| l.len()).max().unwrap_or(0);
    let total: u64 = values.iter().sum();

    let mut out = String::new();
    if let ChartSpec::Line { series_label, .. } = spec {
        let _ = writeln!(out, "  {}", series_label);
    }
    for (label, value) in labels.iter().zip(values) {
        let bar = ((*value as usize) * width).div_ceil(max as usize);
        let _ = write!(
            out,
            "  {:>lw$} | {} {}",
            label,
            "#".repeat(bar),
            value,
            lw = label_width
        );
        if matches!(spec, ChartSpec::Doughnut { .. }) && total > 0 {
            let _ = write!(out, " ({:.0}%)", (*value as f64) * 100.0 / total as f64);
        }
        out.push('\n');
    }
    if labels.is_empty() {
        out.push_str("  (no data)\n");
    }
    out
}

/// Full text rendering of the view
pub fn render_screen(view: &DashboardView, canvas: &ChartCanvas) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "==================== DHCP Lab ====================");
    if !view.status_text.is_empty() {
        let _ = writeln!(out, "Status: {}", view.status_text);
    }
    let _ = writeln!(
        out,
        "iface={} target={}",
        view.inputs.iface,
        if view.inputs.target_ip.is_empty() {
            "-"
        } else {
            view.inputs.target_ip.as_str()
        }
    );

    if view.has_rows() {
        let _ = writeln!(out, "\nAttacks:");
        for row in view.rows() {
            let mut controls = Vec::new();
            if row.start.visible {
                let state = if row.start.enabled { "" } else { " (disabled)" };
                controls.push(format!("[{}{}]", row.start.label, state));
            }
            if row.stop.visible {
                controls.push(format!("[{}]", row.stop.label));
            }
            let _ = writeln!(
                out,
                "  {:<12} {:<8} {}",
                row.kind,
                row.badge.label(),
                controls.join(" ")
            );
        }
    }

    let _ = writeln!(out, "\nRecon:{}", if view.recon.spinner_visible { " (scanning)" } else { "" });
    match &view.recon.display {
        ReconDisplay::Idle => {}
        ReconDisplay::Scanning => {
            let _ = writeln!(out, "  Scanning...");
        }
        ReconDisplay::Failed(error) => {
            let _ = writeln!(out, "  Error: {}", error);
        }
        ReconDisplay::Inconclusive(result) => {
            let _ = writeln!(out, "  Warning: {}", result);
        }
        ReconDisplay::Found {
            server_ip,
            server_mac,
            offered_ip,
        } => {
            let _ = writeln!(out, "  DHCP Server Found!");
            let _ = writeln!(out, "  IP: {}", server_ip);
            let _ = writeln!(out, "  MAC: {}", server_mac);
            let _ = writeln!(out, "  Offer IP: {}", offered_ip);
        }
        ReconDisplay::CommunicationError => {
            let _ = writeln!(out, "  Communication Error");
        }
    }

    for (title, kind) in [
        ("Traffic", ChartKind::Traffic),
        ("Message types", ChartKind::MessageTypes),
    ] {
        if let Some(chart) = canvas.drawn(kind) {
            let _ = writeln!(out, "\n{}:", title);
            out.push_str(&chart);
        }
    }

    if !view.log.lines.is_empty() {
        let _ = writeln!(out, "\nLog:");
        let end = view.log.scroll_top.min(view.log.lines.len());
        let start = end.saturating_sub(LOG_TAIL);
        for line in &view.log.lines[start..end] {
            let marker = if line.anomaly { "!" } else { " " };
            let _ = writeln!(out, " {} {}", marker, line.text);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dhcp_lab_core::config::BucketOrder;
    use dhcp_lab_core::models::LogEntry;
    use dhcp_lab_core::reconcile::reconcile_row;
    use dhcp_lab_core::render::{render_charts, render_logs};
    use dhcp_lab_core::PageLayout;

    fn entry(ts: &str, kind: &str, anomaly: bool) -> LogEntry {
        LogEntry {
            timestamp: ts.into(),
            message_type: kind.into(),
            mac_address: "aa:bb".into(),
            ip_address: None,
            details: "x".into(),
            is_anomaly: anomaly,
        }
    }

    #[test]
    fn bars_scale_to_width() {
        let spec = ChartSpec::Line {
            series_label: "Packets / Second".into(),
            labels: vec!["10:00:00".into(), "10:00:01".into()],
            values: vec![4, 2],
        };
        let text = draw_bars(&spec, 8);
        assert!(text.contains("10:00:00 | ######## 4"));
        assert!(text.contains("10:00:01 | #### 2"));
    }

    #[test]
    fn canvas_holds_one_chart_per_slot_after_redraws() {
        let canvas = ChartCanvas::default();
        let mut view = DashboardView::bind(
            &PageLayout::with_rows(["starvation"]),
            Box::new(TextChartBackend::new(canvas.clone(), 20)),
        );
        let logs = vec![
            entry("2024-01-01T10:00:00.000Z", "DISCOVER", false),
            entry("2024-01-01T10:00:00.500Z", "OFFER", true),
        ];

        render_charts(&mut view.charts, &logs, BucketOrder::FirstAppearance);
        render_charts(&mut view.charts, &logs, BucketOrder::FirstAppearance);
        assert_eq!(canvas.live_charts(), 2);

        render_logs(&mut view.log, &logs);
        reconcile_row(&mut view, "starvation", true);

        let screen = render_screen(&view, &canvas);
        assert!(screen.contains("starvation   Running"));
        assert!(screen.contains("[Stop Attack]"));
        assert!(screen.contains("10:00:00 | "));
        assert!(screen.contains(" ! [2024-01-01 10:00:00.500Z] OFFER - aa:bb : x"));
    }
}
