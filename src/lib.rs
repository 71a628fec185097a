//! quantsig: technical-indicator trading signals with a durable decision log.
//!
//! Hexagonal architecture: pure domain logic in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`], and the concurrent
//! per-symbol orchestration in [`pipeline`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod logging;
pub mod pipeline;
pub mod ports;
