pub mod client;
pub mod models;
#[cfg(test)]
pub(crate) mod test_server;

pub use client::FixerClient;
pub use models::{ApiError, RatesResponse};
