pub mod errors;
pub mod db;
pub mod customer;
pub mod provider;
pub mod home_service;
pub mod subscription;
pub mod review;
