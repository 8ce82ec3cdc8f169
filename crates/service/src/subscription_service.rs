//! Customer subscriptions to services.
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::{info, instrument, warn};

use common::types::{NewSubscription, SubscriptionView};
use models::{home_service, subscription};

use crate::errors::ServiceError;
use crate::{catalog, customer_service, provider_service};

async fn into_views(db: &DatabaseConnection, rows: Vec<subscription::Model>) -> Result<Vec<SubscriptionView>, ServiceError> {
    let services = catalog::views_by_ids(db, rows.iter().map(|s| s.service_id)).await?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(service) = services.get(&row.service_id).cloned() else {
            warn!(subscription_id = row.id, service_id = row.service_id, "subscription service missing");
            continue;
        };
        out.push(SubscriptionView { id: row.id, customer_id: row.customer_id, service, subscribed_at: row.subscribed_at });
    }
    Ok(out)
}

async fn list_where(db: &DatabaseConnection, filter: Option<sea_orm::Condition>) -> Result<Vec<SubscriptionView>, ServiceError> {
    let mut q = subscription::Entity::find();
    if let Some(cond) = filter {
        q = q.filter(cond);
    }
    let rows = q.order_by_asc(subscription::Column::Id).all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    into_views(db, rows).await
}

#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, input: NewSubscription) -> Result<SubscriptionView, ServiceError> {
    customer_service::find_model(db, input.customer_id).await?;
    let service = catalog::get(db, input.service_id).await?;
    if subscription::find_pair(db, input.customer_id, input.service_id).await?.is_some() {
        return Err(ServiceError::conflict("Customer is already subscribed to this service"));
    }
    let row = subscription::create(db, input.customer_id, input.service_id).await?;
    info!(subscription_id = row.id, customer_id = row.customer_id, service_id = row.service_id, "subscribed");
    Ok(SubscriptionView { id: row.id, customer_id: row.customer_id, service, subscribed_at: row.subscribed_at })
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<SubscriptionView>, ServiceError> {
    list_where(db, None).await
}

pub async fn get(db: &DatabaseConnection, id: i32) -> Result<SubscriptionView, ServiceError> {
    let row = subscription::Entity::find_by_id(id)
        .one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("Subscription", id))?;
    into_views(db, vec![row]).await?
        .pop()
        .ok_or_else(|| ServiceError::not_found("Subscription", id))
}

pub async fn list_by_customer(db: &DatabaseConnection, customer_id: i32) -> Result<Vec<SubscriptionView>, ServiceError> {
    customer_service::find_model(db, customer_id).await?;
    list_where(db, Some(sea_orm::Condition::all().add(subscription::Column::CustomerId.eq(customer_id)))).await
}

pub async fn list_by_service(db: &DatabaseConnection, service_id: i32) -> Result<Vec<SubscriptionView>, ServiceError> {
    catalog::find_model(db, service_id).await?;
    list_where(db, Some(sea_orm::Condition::all().add(subscription::Column::ServiceId.eq(service_id)))).await
}

/// Subscriptions to any service owned by the provider.
pub async fn list_by_provider(db: &DatabaseConnection, provider_id: i32) -> Result<Vec<SubscriptionView>, ServiceError> {
    provider_service::find_model(db, provider_id).await?;
    let service_ids: Vec<i32> = home_service::Entity::find()
        .select_only()
        .column(home_service::Column::Id)
        .filter(home_service::Column::ProviderId.eq(provider_id))
        .into_tuple()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if service_ids.is_empty() {
        return Ok(Vec::new());
    }
    list_where(db, Some(sea_orm::Condition::all().add(subscription::Column::ServiceId.is_in(service_ids)))).await
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let res = subscription::Entity::delete_by_id(id).exec(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Subscription", id));
    }
    info!(subscription_id = id, "unsubscribed");
    Ok(())
}

pub async fn delete_pair(db: &DatabaseConnection, customer_id: i32, service_id: i32) -> Result<(), ServiceError> {
    let row = subscription::find_pair(db, customer_id, service_id).await?
        .ok_or_else(|| ServiceError::NotFound(format!(
            "Subscription not found for customer {} and service {}", customer_id, service_id
        )))?;
    delete(db, row.id).await
}

pub async fn is_subscribed(db: &DatabaseConnection, customer_id: i32, service_id: i32) -> Result<bool, ServiceError> {
    Ok(subscription::find_pair(db, customer_id, service_id).await?.is_some())
}

pub async fn count_by_customer(db: &DatabaseConnection, customer_id: i32) -> Result<u64, ServiceError> {
    subscription::Entity::find()
        .filter(subscription::Column::CustomerId.eq(customer_id))
        .count(db).await.map_err(|e| ServiceError::Db(e.to_string()))
}

pub async fn count_by_service(db: &DatabaseConnection, service_id: i32) -> Result<u64, ServiceError> {
    subscription::Entity::find()
        .filter(subscription::Column::ServiceId.eq(service_id))
        .count(db).await.map_err(|e| ServiceError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_marketplace};

    #[tokio::test]
    async fn subscribe_once_then_conflict() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let seed = seed_marketplace(&db).await?;
        let input = NewSubscription { customer_id: seed.customer_id, service_id: seed.service_ids[0] };
        let sub = create(&db, input).await?;
        assert_eq!(sub.service.id, seed.service_ids[0]);
        assert!(is_subscribed(&db, seed.customer_id, seed.service_ids[0]).await?);

        let again = create(&db, input).await;
        assert!(matches!(again, Err(ServiceError::Conflict { .. })));
        assert_eq!(count_by_customer(&db, seed.customer_id).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn create_requires_existing_parties() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let seed = seed_marketplace(&db).await?;
        let missing_customer = create(&db, NewSubscription { customer_id: 9999, service_id: seed.service_ids[0] }).await;
        assert!(matches!(missing_customer, Err(ServiceError::NotFound(_))));
        let missing_service = create(&db, NewSubscription { customer_id: seed.customer_id, service_id: 9999 }).await;
        assert!(matches!(missing_service, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn listings_and_pair_delete() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let seed = seed_marketplace(&db).await?;
        for sid in &seed.service_ids {
            create(&db, NewSubscription { customer_id: seed.customer_id, service_id: *sid }).await?;
        }
        assert_eq!(list_by_customer(&db, seed.customer_id).await?.len(), seed.service_ids.len());
        assert_eq!(list_by_service(&db, seed.service_ids[0]).await?.len(), 1);
        assert_eq!(list_by_provider(&db, seed.provider_id).await?.len(), seed.service_ids.len());
        assert_eq!(count_by_service(&db, seed.service_ids[1]).await?, 1);

        delete_pair(&db, seed.customer_id, seed.service_ids[0]).await?;
        assert!(!is_subscribed(&db, seed.customer_id, seed.service_ids[0]).await?);
        assert!(matches!(delete_pair(&db, seed.customer_id, seed.service_ids[0]).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
