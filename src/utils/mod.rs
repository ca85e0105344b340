pub mod ratelimit;
pub mod table;

pub use table::Table;
