use chrono::NaiveDate;
use crate::config::Config;
use crate::models::Session;
use crate::services::timeline_service;

/// Print the dates that would be queried, most recent first
pub fn execute(config: &Config, args: &[&str]) -> Result<(), String> {
    tracing::info!("🗓️ Timeline command called with args: {:?}", args);

    let request = super::parse_request(config, args)?;
    print!("{}", render(&request.session, super::today()));
    Ok(())
}

fn render(session: &Session, today: NaiveDate) -> String {
    timeline_service::timeline_for(session, today)
        .iter()
        .map(|date| format!("{}\n", date))
        .collect()
}
