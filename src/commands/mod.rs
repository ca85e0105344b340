pub mod chart;
pub mod help;
pub mod table;
pub mod timeline;

use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use crate::config::Config;
use crate::models::{CurrencyPair, Interval, Session};
use crate::services::exchange_service::{ExchangeService, ExchangeSnapshot};

/// Selection and output parsed from positional command arguments
#[derive(Debug, Clone, PartialEq)]
pub struct RequestArgs {
    pub session: Session,
    pub output: Option<PathBuf>,
}

/// Run the command named by the first argument. No command means `chart`.
pub async fn handle_args(config: &Config, args: &[String]) -> Result<(), String> {
    let parts: Vec<&str> = args.iter().map(String::as_str).collect();

    let (command, rest) = match parts.split_first() {
        Some((first, rest)) if is_command(first) => (*first, rest),
        _ => ("chart", parts.as_slice()),
    };

    match command {
        "chart" | "c" => chart::execute(config, rest).await,
        "table" | "t" => table::execute(config, rest).await,
        "timeline" | "dates" => timeline::execute(config, rest),
        _ => {
            help::execute();
            Ok(())
        }
    }
}

fn is_command(arg: &str) -> bool {
    matches!(
        arg,
        "chart" | "c" | "table" | "t" | "timeline" | "dates" | "help" | "-h" | "--help"
    )
}

/// Apply positional arguments on top of the configured session.
///
/// Arguments are recognised by shape and may come in any order:
/// `SRC/TGT` pair, interval name, `next` (interval after the configured
/// one), three-letter target code, `*.png` output, `--cascade`.
pub fn parse_request(config: &Config, args: &[&str]) -> Result<RequestArgs, String> {
    let mut session = config.session.clone();
    let mut output = None;

    for arg in args {
        let lowered = arg.to_lowercase();
        if lowered.ends_with(".png") {
            output = Some(PathBuf::from(arg));
        } else if arg.contains('/') {
            session.pair = CurrencyPair::parse(arg)?;
        } else if lowered == "--cascade" {
            session.cascade_tiers = true;
        } else if lowered == "next" {
            session.toggle_interval();
        } else if let Ok(interval) = Interval::parse(arg) {
            session.interval = interval;
        } else if arg.len() == 3 && arg.chars().all(|c| c.is_ascii_alphabetic()) {
            session.change_target(arg)?;
        } else {
            return Err(format!("Unknown argument '{}'. Run `exchange-chart help` for usage", arg));
        }
    }

    Ok(RequestArgs { session, output })
}

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Run one gather cycle against the configured rate provider
pub(crate) async fn gather(config: &Config, session: &Session) -> Result<ExchangeSnapshot, String> {
    let client = config.rate_client();
    tracing::debug!("Using rate provider {}", client.base_url());
    let service = ExchangeService::new(Arc::new(client), config.request_timeout);
    let snapshot = service
        .gather(session, today())
        .await
        .map_err(|e| e.to_string())?;

    if snapshot.report.succeeded == 0 {
        tracing::warn!("No rates were received for {} ({})", session.pair, session.interval);
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    #[test]
    fn test_parse_request_defaults() {
        let request = parse_request(&config(), &[]).unwrap();
        assert_eq!(request.session, config().session);
        assert_eq!(request.output, None);
    }

    #[test]
    fn test_parse_request_any_order() {
        let request = parse_request(&config(), &["out/rates.PNG", "year", "eur/jpy", "--cascade"]).unwrap();

        assert_eq!(request.session.pair.query(), "EUR,JPY");
        assert_eq!(request.session.interval, Interval::Year);
        assert!(request.session.cascade_tiers);
        assert_eq!(request.output, Some(PathBuf::from("out/rates.PNG")));
    }

    #[test]
    fn test_parse_request_target_only() {
        let request = parse_request(&config(), &["chf"]).unwrap();
        assert_eq!(request.session.pair.query(), "USD,CHF");

        let request = parse_request(&config(), &["next"]).unwrap();
        assert_eq!(request.session.interval, Interval::Month);
    }

    #[test]
    fn test_parse_request_rejects_unknown() {
        assert!(parse_request(&config(), &["--frobnicate"]).is_err());
        assert!(parse_request(&config(), &["usd"]).is_err());
        assert!(parse_request(&config(), &["USD/GBP/EUR"]).is_err());
    }

    #[test]
    fn test_command_names() {
        assert!(is_command("chart"));
        assert!(is_command("--help"));
        assert!(!is_command("USD/GBP"));
    }
}
