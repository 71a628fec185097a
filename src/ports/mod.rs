//! Port traits: the seams between the core and its external collaborators.

pub mod commentary;
pub mod config_port;
pub mod history_port;
pub mod market_data;
