//! Home-service catalog: the priced offerings providers publish.
use std::collections::HashMap;

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Select, Set};
use tracing::{info, instrument, warn};

use common::types::{NewService, ServiceUpdate, ServiceView};
use models::errors::require;
use models::{home_service, provider};

use crate::errors::ServiceError;
use crate::provider_service;
use crate::query::icontains;

async fn fetch_views(db: &DatabaseConnection, query: Select<home_service::Entity>) -> Result<Vec<ServiceView>, ServiceError> {
    let rows = query
        .order_by_asc(home_service::Column::Id)
        .find_also_related(provider::Entity)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows
        .into_iter()
        .filter_map(|(svc, owner)| match owner {
            Some(p) => Some(svc.into_view(&p)),
            None => {
                warn!(service_id = svc.id, "service without provider skipped");
                None
            }
        })
        .collect())
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<ServiceView>, ServiceError> {
    fetch_views(db, home_service::Entity::find()).await
}

pub async fn list_active(db: &DatabaseConnection) -> Result<Vec<ServiceView>, ServiceError> {
    fetch_views(db, home_service::Entity::find().filter(home_service::Column::Active.eq(true))).await
}

pub async fn search_by_name(db: &DatabaseConnection, name: &str) -> Result<Vec<ServiceView>, ServiceError> {
    fetch_views(db, home_service::Entity::find().filter(icontains(home_service::Column::Name, name))).await
}

pub async fn list_by_provider(db: &DatabaseConnection, provider_id: i32) -> Result<Vec<ServiceView>, ServiceError> {
    provider_service::find_model(db, provider_id).await?;
    fetch_views(db, home_service::Entity::find().filter(home_service::Column::ProviderId.eq(provider_id))).await
}

/// Views for the given ids, keyed by service id. Unknown ids are absent.
pub async fn views_by_ids(db: &DatabaseConnection, ids: impl IntoIterator<Item = i32>) -> Result<HashMap<i32, ServiceView>, ServiceError> {
    let mut ids: Vec<i32> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let views = fetch_views(db, home_service::Entity::find().filter(home_service::Column::Id.is_in(ids))).await?;
    Ok(views.into_iter().map(|v| (v.id, v)).collect())
}

pub(crate) async fn find_model(db: &DatabaseConnection, id: i32) -> Result<home_service::Model, ServiceError> {
    home_service::Entity::find_by_id(id)
        .one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("Service", id))
}

pub async fn get(db: &DatabaseConnection, id: i32) -> Result<ServiceView, ServiceError> {
    let svc = find_model(db, id).await?;
    let owner = provider_service::find_model(db, svc.provider_id).await?;
    Ok(svc.into_view(&owner))
}

#[instrument(skip(db, input), fields(provider_id = input.provider_id, name = %input.name))]
pub async fn create(db: &DatabaseConnection, input: NewService) -> Result<ServiceView, ServiceError> {
    let owner = provider_service::find_model(db, input.provider_id).await?;
    let created = home_service::create(db, home_service::NewHomeService {
        provider_id: owner.id,
        name: input.name,
        description: input.description,
        price: input.price,
        service_type: input.service_type,
        active: input.active.unwrap_or(true),
    }).await?;
    info!(service_id = created.id, "service_created");
    Ok(created.into_view(&owner))
}

#[instrument(skip(db, changes))]
pub async fn update(db: &DatabaseConnection, id: i32, changes: ServiceUpdate) -> Result<ServiceView, ServiceError> {
    let current = find_model(db, id).await?;
    let mut am: home_service::ActiveModel = current.into();
    if let Some(name) = changes.name {
        require("Service name", &name)?;
        am.name = Set(name.trim().to_string());
    }
    if let Some(description) = changes.description {
        am.description = Set(Some(description));
    }
    if let Some(price) = changes.price {
        home_service::validate_price(price)?;
        am.price = Set(price);
    }
    if let Some(service_type) = changes.service_type {
        am.service_type = Set(Some(service_type));
    }
    if let Some(active) = changes.active {
        am.active = Set(active);
    }
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let owner = provider_service::find_model(db, updated.provider_id).await?;
    Ok(updated.into_view(&owner))
}

pub async fn set_active(db: &DatabaseConnection, id: i32, active: bool) -> Result<ServiceView, ServiceError> {
    let view = update(db, id, ServiceUpdate { active: Some(active), ..Default::default() }).await?;
    info!(service_id = id, active, "service_active_changed");
    Ok(view)
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let res = home_service::Entity::delete_by_id(id).exec(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Service", id));
    }
    info!(service_id = id, "service_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider_service;
    use crate::test_support::{get_db, new_service, provider_registration};

    #[tokio::test]
    async fn create_requires_existing_provider() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let res = create(&db, new_service(999, "Ghost", 10.0)).await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn active_listing_and_toggle() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let p = provider_service::register(&db, provider_registration("cat@pro.com")).await?;
        let a = create(&db, new_service(p.id, "Deep Clean", 120.0)).await?;
        let b = create(&db, new_service(p.id, "Window Wash", 60.0)).await?;
        assert_eq!(a.provider.business_name, "Acme Home Services");

        set_active(&db, b.id, false).await?;
        let active = list_active(&db).await?;
        assert_eq!(active.iter().map(|s| s.id).collect::<Vec<_>>(), vec![a.id]);
        assert_eq!(list_all(&db).await?.len(), 2);

        set_active(&db, b.id, true).await?;
        assert_eq!(list_active(&db).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn search_and_provider_listing() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let p = provider_service::register(&db, provider_registration("s@pro.com")).await?;
        create(&db, new_service(p.id, "Lawn Mowing", 50.0)).await?;
        create(&db, new_service(p.id, "Gutter Cleaning", 40.0)).await?;

        let hits = search_by_name(&db, "lawn").await?;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Lawn Mowing");
        assert_eq!(list_by_provider(&db, p.id).await?.len(), 2);
        assert!(matches!(list_by_provider(&db, p.id + 100).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn negative_price_is_rejected() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let p = provider_service::register(&db, provider_registration("neg@pro.com")).await?;
        assert!(create(&db, new_service(p.id, "Cheap", -1.0)).await.is_err());
        let s = create(&db, new_service(p.id, "Fine", 1.0)).await?;
        assert!(update(&db, s.id, ServiceUpdate { price: Some(-5.0), ..Default::default() }).await.is_err());
        Ok(())
    }
}
