//! Concrete adapter implementations for the port traits.

pub mod commentary;
pub mod csv_export;
pub mod file_config;
pub mod json_history;
pub mod mock_data;
pub mod yahoo;
