//! Provider accounts.
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, instrument};

use common::types::{ProviderRegistration, ProviderUpdate, ProviderView};
use models::errors::{require, validate_email};
use models::provider;

use crate::auth::service::hash_password;
use crate::errors::ServiceError;

#[instrument(skip(db, input), fields(email = %input.email))]
pub async fn register(db: &DatabaseConnection, input: ProviderRegistration) -> Result<ProviderView, ServiceError> {
    validate_email(&input.email)?;
    if provider::find_by_email(db, &input.email).await?.is_some() {
        return Err(ServiceError::duplicate_email(input.email.trim()));
    }
    let password_hash = hash_password(&input.password)?;
    let created = provider::create(db, provider::NewProvider {
        first_name: input.first_name,
        last_name: input.last_name,
        business_name: input.business_name,
        email: input.email,
        phone: input.phone,
        address: input.address,
        license_number: input.license_number,
        years_experience: input.years_experience,
        primary_service: input.primary_service,
        password_hash,
    }).await?;
    info!(provider_id = created.id, business = %created.business_name, "provider_registered");
    Ok(created.into())
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<ProviderView>, ServiceError> {
    let rows = provider::Entity::find()
        .order_by_asc(provider::Column::Id)
        .all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn list_active(db: &DatabaseConnection) -> Result<Vec<ProviderView>, ServiceError> {
    let rows = provider::Entity::find()
        .filter(provider::Column::Active.eq(true))
        .order_by_asc(provider::Column::Id)
        .all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub(crate) async fn find_model(db: &DatabaseConnection, id: i32) -> Result<provider::Model, ServiceError> {
    provider::Entity::find_by_id(id)
        .one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("Provider", id))
}

pub async fn get(db: &DatabaseConnection, id: i32) -> Result<ProviderView, ServiceError> {
    Ok(find_model(db, id).await?.into())
}

#[instrument(skip(db, changes))]
pub async fn update(db: &DatabaseConnection, id: i32, changes: ProviderUpdate) -> Result<ProviderView, ServiceError> {
    let current = find_model(db, id).await?;
    let mut am: provider::ActiveModel = current.clone().into();

    if let Some(v) = changes.first_name {
        require("First name", &v)?;
        am.first_name = Set(v.trim().to_string());
    }
    if let Some(v) = changes.last_name {
        require("Last name", &v)?;
        am.last_name = Set(v.trim().to_string());
    }
    if let Some(v) = changes.business_name {
        require("Business name", &v)?;
        am.business_name = Set(v.trim().to_string());
    }
    if let Some(email) = changes.email {
        validate_email(&email)?;
        let email = email.trim().to_string();
        if email != current.email && provider::find_by_email(db, &email).await?.is_some() {
            return Err(ServiceError::duplicate_email(&email));
        }
        am.email = Set(email);
    }
    if let Some(v) = changes.phone {
        require("Phone", &v)?;
        am.phone = Set(v.trim().to_string());
    }
    if let Some(v) = changes.address {
        require("Address", &v)?;
        am.address = Set(v.trim().to_string());
    }
    if let Some(v) = changes.license_number {
        am.license_number = Set(Some(v));
    }
    if let Some(v) = changes.years_experience {
        provider::validate_years(Some(v))?;
        am.years_experience = Set(Some(v));
    }
    if let Some(v) = changes.primary_service {
        am.primary_service = Set(Some(v));
    }
    if let Some(v) = changes.active {
        am.active = Set(v);
    }
    if let Some(password) = changes.password.filter(|p| !p.is_empty()) {
        am.password_hash = Set(hash_password(&password)?);
    }
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(provider_id = id, "provider_updated");
    Ok(updated.into())
}

/// Delete a provider and, by cascade, its services.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let res = provider::Entity::delete_by_id(id).exec(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Provider", id));
    }
    info!(provider_id = id, "provider_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, provider_registration};

    #[tokio::test]
    async fn register_list_and_deactivate() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let a = register(&db, provider_registration("a@pro.com")).await?;
        let b = register(&db, provider_registration("b@pro.com")).await?;
        assert!(a.active && b.active);

        update(&db, b.id, ProviderUpdate { active: Some(false), ..Default::default() }).await?;
        let active = list_active(&db).await?;
        assert_eq!(active.iter().map(|p| p.id).collect::<Vec<_>>(), vec![a.id]);
        assert_eq!(list(&db).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        register(&db, provider_registration("dup@pro.com")).await?;
        let err = register(&db, provider_registration("dup@pro.com")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { field: Some("email"), .. }));
        Ok(())
    }

    #[tokio::test]
    async fn negative_experience_is_rejected() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let p = register(&db, provider_registration("exp@pro.com")).await?;
        let res = update(&db, p.id, ProviderUpdate { years_experience: Some(-2), ..Default::default() }).await;
        assert!(matches!(res, Err(ServiceError::Model(_))));
        Ok(())
    }
}
