//! Prometheus metrics for the store and its remote source.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

/// Latency of calls to the user source, labelled by `call`
pub const SOURCE_LATENCY_METRIC: &str = "roster_source_latency_seconds";

/// Install the Prometheus recorder
///
/// Nothing is served over the network; the returned handle renders the current
/// values on demand.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let builder = PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full(SOURCE_LATENCY_METRIC.to_string()),
        &[0.01, 0.1, 0.25, 0.5, 1.0, 1.5, 2.0, 2.5, 5.0],
    )?;

    let handle = builder.install_recorder()?;

    Ok(handle)
}

/// Outcome of a score refresh, used as a metric label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A user received a new score
    Updated,
    /// The source picked an id that is not loaded
    Missing,
    Failed,
}

impl RefreshOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Missing => "missing",
            Self::Failed => "error",
        }
    }
}

const fn status_label(success: bool) -> &'static str {
    if success { "success" } else { "error" }
}

/// Record a full user fetch
pub fn record_fetch_event(success: bool) {
    counter!("roster_fetch_total", "status" => status_label(success)).increment(1);
}

/// Record a background score refresh
pub fn record_refresh_event(outcome: RefreshOutcome) {
    counter!("roster_refresh_total", "outcome" => outcome.as_str()).increment(1);
}

/// Record a manual score edit
pub fn record_score_edit(found: bool) {
    counter!(
        "roster_score_edits_total",
        "status" => if found { "applied" } else { "ignored" }
    )
    .increment(1);
}

/// Record how long a call to the user source took
pub fn record_source_latency(call: &'static str, duration_secs: f64) {
    histogram!(SOURCE_LATENCY_METRIC, "call" => call).record(duration_secs);
}
