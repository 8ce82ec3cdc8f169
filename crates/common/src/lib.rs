//! Shared building blocks for the HomeConnect workspace: wire types exchanged
//! between server and client, logging setup, runtime environment checks and
//! Prometheus metrics.

pub mod types;
pub mod utils;
pub mod env;
pub mod metrics;
