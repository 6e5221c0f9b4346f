// Chart renderer
//
// Derives the traffic-over-time and message-type views from a log snapshot
// and hands them to a ChartBackend. RenderState owns the two chart slots and
// always destroys a slot's previous chart before creating its replacement.

use crate::config::BucketOrder;
use crate::models::LogEntry;
use std::collections::HashMap;
use tracing::debug;

pub const TRAFFIC_SERIES_LABEL: &str = "Packets / Second";

/// The two chart regions of the dashboard
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChartKind {
    /// Line chart of entries per second
    Traffic,
    /// Doughnut of entries per message type
    MessageTypes,
}

/// Backend-assigned handle of a live chart
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChartId(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub enum ChartSpec {
    Line {
        series_label: String,
        labels: Vec<String>,
        values: Vec<u64>,
    },
    Doughnut {
        labels: Vec<String>,
        values: Vec<u64>,
    },
}

impl ChartSpec {
    pub fn labels(&self) -> &[String] {
        match self {
            ChartSpec::Line { labels, .. } | ChartSpec::Doughnut { labels, .. } => labels,
        }
    }

    pub fn values(&self) -> &[u64] {
        match self {
            ChartSpec::Line { values, .. } | ChartSpec::Doughnut { values, .. } => values,
        }
    }
}

/// Drawing surface for charts
pub trait ChartBackend: Send {
    /// Draw a new chart into `slot` and return its handle
    fn create(&mut self, slot: ChartKind, spec: &ChartSpec) -> ChartId;

    /// Tear down a chart previously returned by `create`
    fn destroy(&mut self, id: ChartId);
}

/// Backend that draws nothing; hands out fresh ids
#[derive(Debug, Default)]
pub struct HeadlessCharts {
    next_id: u64,
}

impl ChartBackend for HeadlessCharts {
    fn create(&mut self, _slot: ChartKind, _spec: &ChartSpec) -> ChartId {
        self.next_id += 1;
        ChartId(self.next_id)
    }

    fn destroy(&mut self, _id: ChartId) {}
}

struct LiveChart {
    id: ChartId,
    spec: ChartSpec,
}

/// Owner of the two chart slots
pub struct RenderState {
    backend: Box<dyn ChartBackend>,
    traffic: Option<LiveChart>,
    message_types: Option<LiveChart>,
}

impl RenderState {
    pub fn new(backend: Box<dyn ChartBackend>) -> Self {
        Self {
            backend,
            traffic: None,
            message_types: None,
        }
    }

    fn slot_mut(&mut self, kind: ChartKind) -> &mut Option<LiveChart> {
        match kind {
            ChartKind::Traffic => &mut self.traffic,
            ChartKind::MessageTypes => &mut self.message_types,
        }
    }

    /// Destroy whatever occupies `kind`, then create `spec` in its place
    pub fn replace(&mut self, kind: ChartKind, spec: ChartSpec) -> ChartId {
        if let Some(old) = self.slot_mut(kind).take() {
            self.backend.destroy(old.id);
        }
        let id = self.backend.create(kind, &spec);
        *self.slot_mut(kind) = Some(LiveChart { id, spec });
        id
    }

    pub fn current(&self, kind: ChartKind) -> Option<&ChartSpec> {
        let slot = match kind {
            ChartKind::Traffic => &self.traffic,
            ChartKind::MessageTypes => &self.message_types,
        };
        slot.as_ref().map(|chart| &chart.spec)
    }

    pub fn chart_id(&self, kind: ChartKind) -> Option<ChartId> {
        match kind {
            ChartKind::Traffic => self.traffic.as_ref().map(|c| c.id),
            ChartKind::MessageTypes => self.message_types.as_ref().map(|c| c.id),
        }
    }

    /// Destroy both charts
    pub fn clear(&mut self) {
        for kind in [ChartKind::Traffic, ChartKind::MessageTypes] {
            if let Some(old) = self.slot_mut(kind).take() {
                self.backend.destroy(old.id);
            }
        }
    }
}

impl Drop for RenderState {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Time-of-day bucket (second resolution) of an ISO-8601 timestamp, taken
/// verbatim from the string: no timezone normalization.
pub fn time_bucket(timestamp: &str) -> &str {
    let time = timestamp
        .split_once('T')
        .map(|(_, time)| time)
        .unwrap_or(timestamp);
    time.split_once('.').map(|(whole, _)| whole).unwrap_or(time)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrafficSeries {
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
}

/// Count entries per time bucket
pub fn traffic_series(logs: &[LogEntry], order: BucketOrder) -> TrafficSeries {
    let mut buckets = count_first_seen(logs.iter().map(|log| time_bucket(&log.timestamp)));
    if order == BucketOrder::Chronological {
        buckets.sort_by(|a, b| a.0.cmp(&b.0));
    }
    let (labels, counts) = buckets.into_iter().unzip();
    TrafficSeries { labels, counts }
}

/// Count entries per message type, in order of first appearance
pub fn type_distribution(logs: &[LogEntry]) -> Vec<(String, u64)> {
    count_first_seen(logs.iter().map(|log| log.message_type.as_str()))
}

fn count_first_seen<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, u64)> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(String, u64)> = Vec::new();
    for key in keys {
        match index.get(key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key, counts.len());
                counts.push((key.to_string(), 1));
            }
        }
    }
    counts
}

/// Redraw both charts from `logs`
pub fn render_charts(state: &mut RenderState, logs: &[LogEntry], order: BucketOrder) {
    let traffic = traffic_series(logs, order);
    let (type_labels, type_counts) = type_distribution(logs).into_iter().unzip();

    debug!(
        target: "render",
        entries = logs.len(),
        buckets = traffic.labels.len(),
        "Rendering charts"
    );

    state.replace(
        ChartKind::Traffic,
        ChartSpec::Line {
            series_label: TRAFFIC_SERIES_LABEL.to_string(),
            labels: traffic.labels,
            values: traffic.counts,
        },
    );
    state.replace(
        ChartKind::MessageTypes,
        ChartSpec::Doughnut {
            labels: type_labels,
            values: type_counts,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_truncates_to_seconds() {
        assert_eq!(time_bucket("2024-01-01T10:00:00.000Z"), "10:00:00");
        assert_eq!(time_bucket("2024-01-01T10:00:01.999+02:00"), "10:00:01");
    }

    #[test]
    fn bucket_without_fraction_keeps_suffix() {
        assert_eq!(time_bucket("2024-01-01T10:00:00Z"), "10:00:00Z");
    }

    #[test]
    fn bucket_without_date_part_uses_whole_string() {
        assert_eq!(time_bucket("10:00:00.5"), "10:00:00");
    }

    #[test]
    fn headless_backend_hands_out_distinct_ids() {
        let mut state = RenderState::new(Box::<HeadlessCharts>::default());
        let a = state.replace(
            ChartKind::Traffic,
            ChartSpec::Doughnut {
                labels: vec![],
                values: vec![],
            },
        );
        let b = state.replace(
            ChartKind::Traffic,
            ChartSpec::Doughnut {
                labels: vec![],
                values: vec![],
            },
        );
        assert_ne!(a, b);
        assert_eq!(state.chart_id(ChartKind::Traffic), Some(b));
    }
}
