pub const USAGE: &str = "\
exchange-chart - historical exchange rates as a line chart

USAGE:
    exchange-chart [chart] [SRC/TGT] [INTERVAL] [OUTPUT.png] [--cascade]
    exchange-chart table [SRC/TGT] [INTERVAL] [--cascade]
    exchange-chart timeline [INTERVAL] [--cascade]
    exchange-chart help

INTERVALS:
    week    7 daily samples
    month   5 samples, 2 days apart
    year    9 samples, 2 weeks apart
    decade  7 samples, 6 months apart

ARGUMENTS:
    SRC/TGT     currency pair, e.g. USD/GBP (a lone code like EUR replaces the target)
    next        use the interval after the configured one
    --cascade   also sample every longer interval after the selected one

ENVIRONMENT:
    EXCHANGE_API_URL, EXCHANGE_API_KEY, EXCHANGE_SOURCE, EXCHANGE_TARGET,
    EXCHANGE_INTERVAL, EXCHANGE_CASCADE_TIERS, EXCHANGE_TIMEOUT_SECS,
    EXCHANGE_MAX_RPS, CHART_OUTPUT, CHART_WIDTH, CHART_HEIGHT, RUST_LOG
";

pub fn execute() {
    println!("{}", USAGE);
}
