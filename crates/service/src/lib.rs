//! Service layer providing business operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Returns the JSON view types from `common::types`.

pub mod errors;
pub mod auth;
pub mod query;
pub mod customer_service;
pub mod provider_service;
pub mod catalog;
pub mod subscription_service;
pub mod review_service;
pub mod location;
#[cfg(test)]
pub mod test_support;
