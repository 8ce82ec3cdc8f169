//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Password hashing, credential checks and session tokens for both
//! customer and provider accounts.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::AuthService;
