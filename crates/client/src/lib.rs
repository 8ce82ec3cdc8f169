//! Typed client for the HomeConnect REST API.
//!
//! - [`api::HomeConnectClient`]: one async method per endpoint
//! - [`discovery`]: service list enrichment, filtering and sorting
//! - [`portal::CustomerPortal`]: a logged-in customer's subscriptions and reviews

pub mod errors;
pub mod api;
pub mod discovery;
pub mod portal;

pub use api::HomeConnectClient;
pub use errors::ClientError;
