use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics::describe_counter;
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;

use crate::{services::DiaryService, AppState};

pub struct MetricsState {
    pub handle: PrometheusHandle,
}

/// Install the global Prometheus recorder
pub fn setup_metrics_recorder() -> Result<MetricsState, BuildError> {
    // Histogram buckets for latency (in seconds)
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()?;

    describe_counter!("http_requests_total", "HTTP requests by route, method and status");
    describe_counter!(
        "diary_transactions_total",
        "Request transactions by outcome (commit, commit_failed or rollback)"
    );

    Ok(MetricsState { handle })
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler<S: DiaryService>(
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    match &state.metrics {
        Some(metrics) => (StatusCode::OK, metrics.handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}
