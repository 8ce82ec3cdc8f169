//! Customer accounts: registration, lookup, search, profile update, removal.
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::{info, instrument};

use common::types::{CustomerRegistration, CustomerUpdate, CustomerView};
use models::customer;
use models::errors::{require, validate_email};

use crate::auth::service::hash_password;
use crate::errors::ServiceError;
use crate::query::icontains;

/// Optional filters for `GET /api/customers/search`; all given filters must match.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSearch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
}

#[instrument(skip(db, input), fields(email = %input.email))]
pub async fn register(db: &DatabaseConnection, input: CustomerRegistration) -> Result<CustomerView, ServiceError> {
    customer::validate_profile(&input.first_name, &input.last_name, &input.email, &input.phone_number, &input.address)?;
    if customer::find_by_email(db, &input.email).await?.is_some() {
        return Err(ServiceError::duplicate_email(input.email.trim()));
    }
    let password_hash = hash_password(&input.password)?;
    let created = customer::create(db, customer::NewCustomer {
        first_name: input.first_name,
        last_name: input.last_name,
        email: input.email,
        phone_number: input.phone_number,
        address: input.address,
        password_hash,
    }).await?;
    info!(customer_id = created.id, "customer_registered");
    Ok(created.into())
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<CustomerView>, ServiceError> {
    let rows = customer::Entity::find()
        .order_by_asc(customer::Column::Id)
        .all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub(crate) async fn find_model(db: &DatabaseConnection, id: i32) -> Result<customer::Model, ServiceError> {
    customer::Entity::find_by_id(id)
        .one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("Customer", id))
}

pub async fn get(db: &DatabaseConnection, id: i32) -> Result<CustomerView, ServiceError> {
    Ok(find_model(db, id).await?.into())
}

pub async fn get_by_email(db: &DatabaseConnection, email: &str) -> Result<CustomerView, ServiceError> {
    customer::find_by_email(db, email).await?
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("Customer not found with email: {}", email)))
}

pub async fn search(db: &DatabaseConnection, filter: CustomerSearch) -> Result<Vec<CustomerView>, ServiceError> {
    let mut q = customer::Entity::find();
    if let Some(first) = filter.first_name.as_deref().filter(|s| !s.trim().is_empty()) {
        q = q.filter(icontains(customer::Column::FirstName, first));
    }
    if let Some(last) = filter.last_name.as_deref().filter(|s| !s.trim().is_empty()) {
        q = q.filter(icontains(customer::Column::LastName, last));
    }
    if let Some(addr) = filter.address.as_deref().filter(|s| !s.trim().is_empty()) {
        q = q.filter(icontains(customer::Column::Address, addr));
    }
    let rows = q.order_by_asc(customer::Column::Id).all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn find_by_phone(db: &DatabaseConnection, phone_number: &str) -> Result<CustomerView, ServiceError> {
    customer::Entity::find()
        .filter(customer::Column::PhoneNumber.eq(phone_number.trim()))
        .one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("Customer not found with phone number: {}", phone_number)))
}

/// Partial update; an empty password keeps the current hash.
#[instrument(skip(db, changes))]
pub async fn update(db: &DatabaseConnection, id: i32, changes: CustomerUpdate) -> Result<CustomerView, ServiceError> {
    let current = find_model(db, id).await?;
    let mut am: customer::ActiveModel = current.clone().into();

    if let Some(first) = changes.first_name {
        require("First name", &first)?;
        am.first_name = Set(first.trim().to_string());
    }
    if let Some(last) = changes.last_name {
        require("Last name", &last)?;
        am.last_name = Set(last.trim().to_string());
    }
    if let Some(email) = changes.email {
        validate_email(&email)?;
        let email = email.trim().to_string();
        if email != current.email && customer::find_by_email(db, &email).await?.is_some() {
            return Err(ServiceError::duplicate_email(&email));
        }
        am.email = Set(email);
    }
    if let Some(phone) = changes.phone_number {
        require("Phone number", &phone)?;
        am.phone_number = Set(phone.trim().to_string());
    }
    if let Some(address) = changes.address {
        require("Address", &address)?;
        am.address = Set(address.trim().to_string());
    }
    if let Some(password) = changes.password.filter(|p| !p.is_empty()) {
        am.password_hash = Set(hash_password(&password)?);
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(customer_id = id, "customer_updated");
    Ok(updated.into())
}

/// Delete a customer; subscriptions and reviews go with it.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let res = customer::Entity::delete_by_id(id).exec(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Customer", id));
    }
    info!(customer_id = id, "customer_deleted");
    Ok(())
}
