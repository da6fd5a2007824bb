use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static RECORDER: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the Prometheus recorder when PROMETHEUS_ENABLED is set. The
/// request counters and latency histograms registered by the router layer
/// flow through it.
pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = RECORDER.set(handle);
    Ok(())
}

/// Scrape output for the /metrics route; None until `init` has run.
pub(crate) fn render() -> Option<String> {
    RECORDER.get().map(|handle| handle.render())
}
