use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod models;
mod services;
mod utils;

fn init_tracing() {
    let mut filter = EnvFilter::from_default_env();
    for directive in ["exchange_chart=info", "reqwest=warn", "hyper=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    let config = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "💱 exchange-chart v{} using {}",
        env!("CARGO_PKG_VERSION"),
        config.api_base_url
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = commands::handle_args(&config, &args).await {
        error!("❌ {}", e);
        std::process::exit(1);
    }
}
