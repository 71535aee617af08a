// Adapters layer: concrete implementations for external systems (csv files, mysql, http).

pub mod csv_source;
pub mod http;
pub mod memory;
pub mod mysql;
