pub mod chart_service;
pub mod data_table;
pub mod exchange_service;
pub mod timeline_service;
