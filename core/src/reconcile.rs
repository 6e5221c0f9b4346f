// Row status reconciler
//
// Brings one attack row in line with the backend's "is running" flag. Safe to
// apply any number of times; always clears the transient "Starting..." state
// left by a start request.

use crate::view::{DashboardView, StatusBadge, START_LABEL};
use tracing::trace;

/// Apply `running` to the row of `kind`. Returns false when the page has no
/// such row, which is not an error: the status map may list attacks the
/// current page does not show.
pub fn reconcile_row(view: &mut DashboardView, kind: &str, running: bool) -> bool {
    let Some(row) = view.row_mut(kind) else {
        trace!(target: "reconcile", attack = %kind, "No row on this page");
        return false;
    };

    row.start.enabled = true;
    row.start.label = START_LABEL.to_string();

    if running {
        row.badge = StatusBadge::Running;
        row.start.visible = false;
        row.stop.visible = true;
    } else {
        row.badge = StatusBadge::Stopped;
        row.start.visible = true;
        row.stop.visible = false;
    }
    true
}
