#![cfg(test)]
use sea_orm::DatabaseConnection;

use common::types::{CustomerRegistration, NewService, ProviderRegistration};
use models::db::connect_in_memory;

use crate::{catalog, customer_service, provider_service};

/// Fresh in-memory database with migrations applied; each test gets its own.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    connect_in_memory().await
}

pub fn registration(email: &str) -> CustomerRegistration {
    CustomerRegistration {
        first_name: "Test".into(),
        last_name: "Customer".into(),
        email: email.into(),
        phone_number: "336-555-0100".into(),
        address: "12 Elm St, Greensboro, NC".into(),
        password: "Passw0rd!".into(),
    }
}

pub fn provider_registration(email: &str) -> ProviderRegistration {
    ProviderRegistration {
        first_name: "Pat".into(),
        last_name: "Provider".into(),
        business_name: "Acme Home Services".into(),
        email: email.into(),
        phone: "336-555-0199".into(),
        address: "1 Main St, High Point, NC".into(),
        license_number: Some("NC-42".into()),
        years_experience: Some(5),
        primary_service: Some("Cleaning".into()),
        password: "Passw0rd!".into(),
    }
}

pub fn new_service(provider_id: i32, name: &str, price: f64) -> NewService {
    NewService {
        provider_id,
        name: name.into(),
        description: Some(format!("{} by Acme", name)),
        price,
        service_type: Some("Cleaning".into()),
        active: None,
    }
}

pub struct Seed {
    pub customer_id: i32,
    pub provider_id: i32,
    pub service_ids: Vec<i32>,
}

/// One customer, one provider, two services.
pub async fn seed_marketplace(db: &DatabaseConnection) -> Result<Seed, anyhow::Error> {
    let customer = customer_service::register(db, registration("seed@example.com")).await?;
    let provider = provider_service::register(db, provider_registration("seed@pro.com")).await?;
    let a = catalog::create(db, new_service(provider.id, "Deep Clean", 120.0)).await?;
    let b = catalog::create(db, new_service(provider.id, "Window Wash", 60.0)).await?;
    Ok(Seed { customer_id: customer.id, provider_id: provider.id, service_ids: vec![a.id, b.id] })
}
