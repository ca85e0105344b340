use std::sync::Arc;
use crate::config::Config;
use crate::services::chart_service::{self, ChartRequest, PngChartRenderer};

/// Gather rates for the selected window and write them as a PNG chart
pub async fn execute(config: &Config, args: &[&str]) -> Result<(), String> {
    tracing::info!("📈 Chart command called with args: {:?}", args);

    let request = super::parse_request(config, args)?;
    let snapshot = super::gather(config, &request.session).await?;

    let output = request.output.unwrap_or_else(|| config.chart_output.clone());
    let renderer = Arc::new(PngChartRenderer::new(
        output.clone(),
        config.chart_width,
        config.chart_height,
    ));

    chart_service::render_in_background(renderer, ChartRequest::from_snapshot(&snapshot))
        .await
        .map_err(|e| e.to_string())?;

    tracing::info!("Chart written to {}", output.display());
    println!(
        "{} ({}): {} of {} dates plotted -> {}",
        snapshot.pair,
        snapshot.interval,
        snapshot.report.succeeded,
        snapshot.report.requested,
        output.display()
    );

    Ok(())
}
