// Renderers: turn a scenario's log snapshot into the chart and log views

pub mod charts;
pub mod logs;

pub use charts::{
    render_charts, time_bucket, traffic_series, type_distribution, ChartBackend, ChartId,
    ChartKind, ChartSpec, HeadlessCharts, RenderState, TrafficSeries, TRAFFIC_SERIES_LABEL,
};
pub use logs::{display_timestamp, format_log_line, render_logs};
