//! Core domain types and logic.

pub mod config;
pub mod decision;
pub mod error;
pub mod history;
pub mod indicator;
pub mod price;
