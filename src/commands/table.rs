use std::collections::HashMap;
use crate::config::Config;
use crate::models::Series;
use crate::services::exchange_service::ExchangeSnapshot;
use crate::utils::Table;

/// Gather rates for the selected window and print them as a text table
pub async fn execute(config: &Config, args: &[&str]) -> Result<(), String> {
    tracing::info!("📋 Table command called with args: {:?}", args);

    let request = super::parse_request(config, args)?;
    let snapshot = super::gather(config, &request.session).await?;

    print!("{}", build_table(&snapshot).render());
    println!(
        "{} of {} dates received{}",
        snapshot.report.succeeded,
        snapshot.report.requested,
        snapshot
            .base
            .as_ref()
            .map(|base| format!(", rates per 1 {}", base))
            .unwrap_or_default()
    );

    Ok(())
}

fn by_index(series: &Series) -> HashMap<u32, f64> {
    series.points.iter().map(|p| (p.index, p.value)).collect()
}

fn build_table(snapshot: &ExchangeSnapshot) -> Table {
    let cross_header = format!("{} per {}", snapshot.pair.target(), snapshot.pair.source());
    let mut table = Table::new(vec![
        "#",
        "Date",
        snapshot.pair.source(),
        snapshot.pair.target(),
        cross_header.as_str(),
    ]);

    let source = by_index(&snapshot.source_series);
    let target = by_index(&snapshot.target_series);
    let format_rate = |rate: Option<&f64>| rate.map(|r| format!("{:.4}", r)).unwrap_or_else(|| "-".to_string());

    for (index, date) in snapshot.labels.iter().enumerate() {
        let index = index as u32;
        let cross = snapshot
            .table
            .observation(*date)
            .and_then(|observation| observation.cross_rate());

        table.add_row(vec![
            index.to_string(),
            date.to_string(),
            format_rate(source.get(&index)),
            format_rate(target.get(&index)),
            format_rate(cross.as_ref()),
        ]);
    }

    table
}
