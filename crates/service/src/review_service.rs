//! Reviews, rating aggregates and provider replies.
use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set};
use tracing::{info, instrument};

use common::types::{NewReview, ProviderRatingStatistics, RatingSummary, ReviewUpdate, ReviewView};
use models::{customer, home_service, review, subscription};

use crate::errors::ServiceError;
use crate::query::round2;
use crate::{catalog, customer_service, provider_service};

const NOT_SUBSCRIBED: &str = "Customer must be subscribed to the service to write a review";

async fn into_views(db: &DatabaseConnection, rows: Vec<review::Model>) -> Result<Vec<ReviewView>, ServiceError> {
    let customer_ids: Vec<i32> = rows.iter().map(|r| r.customer_id).collect();
    let service_ids: Vec<i32> = rows.iter().map(|r| r.service_id).collect();
    let names: HashMap<i32, String> = customer::Entity::find()
        .filter(customer::Column::Id.is_in(customer_ids))
        .all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|c| (c.id, c.full_name()))
        .collect();
    let services: HashMap<i32, String> = home_service::Entity::find()
        .filter(home_service::Column::Id.is_in(service_ids))
        .all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();
    Ok(rows
        .into_iter()
        .map(|r| ReviewView {
            id: r.id,
            customer_id: r.customer_id,
            customer_name: names.get(&r.customer_id).cloned().unwrap_or_default(),
            service_id: r.service_id,
            service_name: services.get(&r.service_id).cloned().unwrap_or_default(),
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
            provider_response: r.provider_response,
            response_date: r.response_date,
        })
        .collect())
}

async fn fetch(db: &DatabaseConnection, query: Select<review::Entity>) -> Result<Vec<ReviewView>, ServiceError> {
    let rows = query.all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    into_views(db, rows).await
}

fn newest_first(query: Select<review::Entity>) -> Select<review::Entity> {
    query.order_by_desc(review::Column::CreatedAt).order_by_desc(review::Column::Id)
}

async fn provider_service_ids(db: &DatabaseConnection, provider_id: i32) -> Result<Vec<i32>, ServiceError> {
    home_service::Entity::find()
        .select_only()
        .column(home_service::Column::Id)
        .filter(home_service::Column::ProviderId.eq(provider_id))
        .into_tuple()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

async fn ratings_for(db: &DatabaseConnection, service_ids: Vec<i32>) -> Result<Vec<(i32, i32)>, ServiceError> {
    if service_ids.is_empty() {
        return Ok(Vec::new());
    }
    review::Entity::find()
        .select_only()
        .column(review::Column::ServiceId)
        .column(review::Column::Rating)
        .filter(review::Column::ServiceId.is_in(service_ids))
        .into_tuple()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Two-decimal mean, `0.0` for no ratings.
pub fn average(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    round2(ratings.iter().map(|r| f64::from(*r)).sum::<f64>() / ratings.len() as f64)
}

/// Counts per star value with every key 1..=5 present.
pub fn distribution(ratings: &[i32]) -> BTreeMap<i32, u64> {
    let mut dist: BTreeMap<i32, u64> = (1..=5).map(|k| (k, 0)).collect();
    for r in ratings {
        *dist.entry(*r).or_insert(0) += 1;
    }
    dist
}

#[instrument(skip(db, input), fields(customer_id = input.customer_id, service_id = input.service_id))]
pub async fn create(db: &DatabaseConnection, input: NewReview) -> Result<ReviewView, ServiceError> {
    customer_service::find_model(db, input.customer_id).await?;
    catalog::find_model(db, input.service_id).await?;
    if subscription::find_pair(db, input.customer_id, input.service_id).await?.is_none() {
        return Err(ServiceError::Validation(NOT_SUBSCRIBED.into()));
    }
    review::validate_rating(input.rating)?;
    if review::find_pair(db, input.customer_id, input.service_id).await?.is_some() {
        return Err(ServiceError::conflict("Customer has already reviewed this service"));
    }
    let row = review::create(db, input.customer_id, input.service_id, input.rating, &input.comment).await?;
    info!(review_id = row.id, rating = row.rating, "review_created");
    into_views(db, vec![row]).await?
        .pop()
        .ok_or_else(|| ServiceError::Internal("created review vanished".into()))
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<ReviewView>, ServiceError> {
    fetch(db, review::Entity::find().order_by_asc(review::Column::Id)).await
}

async fn find_model(db: &DatabaseConnection, id: i32) -> Result<review::Model, ServiceError> {
    review::Entity::find_by_id(id)
        .one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("Review", id))
}

pub async fn get(db: &DatabaseConnection, id: i32) -> Result<ReviewView, ServiceError> {
    let row = find_model(db, id).await?;
    into_views(db, vec![row]).await?
        .pop()
        .ok_or_else(|| ServiceError::not_found("Review", id))
}

#[instrument(skip(db, changes))]
pub async fn update(db: &DatabaseConnection, id: i32, changes: ReviewUpdate) -> Result<ReviewView, ServiceError> {
    review::validate_rating(changes.rating)?;
    review::validate_comment(&changes.comment)?;
    let mut am: review::ActiveModel = find_model(db, id).await?.into();
    am.rating = Set(changes.rating);
    am.comment = Set(changes.comment.trim().to_string());
    let row = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(review_id = id, rating = row.rating, "review_updated");
    into_views(db, vec![row]).await?
        .pop()
        .ok_or_else(|| ServiceError::not_found("Review", id))
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let res = review::Entity::delete_by_id(id).exec(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Review", id));
    }
    info!(review_id = id, "review_deleted");
    Ok(())
}

pub async fn list_by_service(db: &DatabaseConnection, service_id: i32) -> Result<Vec<ReviewView>, ServiceError> {
    catalog::find_model(db, service_id).await?;
    fetch(db, newest_first(review::Entity::find().filter(review::Column::ServiceId.eq(service_id)))).await
}

pub async fn list_by_customer(db: &DatabaseConnection, customer_id: i32) -> Result<Vec<ReviewView>, ServiceError> {
    customer_service::find_model(db, customer_id).await?;
    fetch(db, newest_first(review::Entity::find().filter(review::Column::CustomerId.eq(customer_id)))).await
}

pub async fn list_by_provider(db: &DatabaseConnection, provider_id: i32) -> Result<Vec<ReviewView>, ServiceError> {
    provider_service::find_model(db, provider_id).await?;
    let ids = provider_service_ids(db, provider_id).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    fetch(db, newest_first(review::Entity::find().filter(review::Column::ServiceId.is_in(ids)))).await
}

pub async fn average_rating(db: &DatabaseConnection, service_id: i32) -> Result<RatingSummary, ServiceError> {
    let svc = catalog::find_model(db, service_id).await?;
    let ratings: Vec<i32> = ratings_for(db, vec![service_id]).await?.into_iter().map(|(_, r)| r).collect();
    Ok(RatingSummary {
        service_id,
        service_name: svc.name,
        average_rating: average(&ratings),
        review_count: ratings.len() as u64,
    })
}

pub async fn rating_distribution(db: &DatabaseConnection, service_id: i32) -> Result<BTreeMap<i32, u64>, ServiceError> {
    catalog::find_model(db, service_id).await?;
    let ratings: Vec<i32> = ratings_for(db, vec![service_id]).await?.into_iter().map(|(_, r)| r).collect();
    Ok(distribution(&ratings))
}

/// Totals across every service the provider owns; per-service averages only
/// cover services with at least one review.
pub async fn provider_statistics(db: &DatabaseConnection, provider_id: i32) -> Result<ProviderRatingStatistics, ServiceError> {
    provider_service::find_model(db, provider_id).await?;
    let services: HashMap<i32, String> = home_service::Entity::find()
        .filter(home_service::Column::ProviderId.eq(provider_id))
        .all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();
    let pairs = ratings_for(db, services.keys().copied().collect()).await?;

    let all: Vec<i32> = pairs.iter().map(|(_, r)| *r).collect();
    let mut by_name: BTreeMap<String, Vec<i32>> = BTreeMap::new();
    for (sid, rating) in &pairs {
        if let Some(name) = services.get(sid) {
            by_name.entry(name.clone()).or_default().push(*rating);
        }
    }
    Ok(ProviderRatingStatistics {
        provider_id,
        total_reviews: all.len() as u64,
        average_rating: average(&all),
        rating_distribution: distribution(&all),
        service_ratings: by_name.into_iter().map(|(name, rs)| (name, average(&rs))).collect(),
    })
}

#[instrument(skip(db, response))]
pub async fn respond(db: &DatabaseConnection, id: i32, response: &str) -> Result<ReviewView, ServiceError> {
    if response.trim().is_empty() {
        return Err(ServiceError::Validation("Response is required".into()));
    }
    let mut am: review::ActiveModel = find_model(db, id).await?.into();
    am.provider_response = Set(Some(response.trim().to_string()));
    am.response_date = Set(Some(Utc::now().into()));
    let row = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(review_id = id, "provider_responded");
    into_views(db, vec![row]).await?
        .pop()
        .ok_or_else(|| ServiceError::not_found("Review", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription_service;
    use crate::test_support::{get_db, seed_marketplace};
    use common::types::NewSubscription;

    fn review_of(customer_id: i32, service_id: i32, rating: i32) -> NewReview {
        NewReview { customer_id, service_id, rating, comment: format!("{} stars", rating) }
    }

    #[test]
    fn average_rounds_to_two_decimals() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[4, 5, 4]), 4.33);
        assert_eq!(average(&[5, 4, 5]), 4.67);
    }

    #[test]
    fn distribution_has_all_buckets() {
        let d = distribution(&[5, 5, 3]);
        assert_eq!(d.len(), 5);
        assert_eq!(d[&5], 2);
        assert_eq!(d[&3], 1);
        assert_eq!(d[&1], 0);
    }

    #[tokio::test]
    async fn review_requires_subscription() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let seed = seed_marketplace(&db).await?;
        let err = create(&db, review_of(seed.customer_id, seed.service_ids[0], 5)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == NOT_SUBSCRIBED));
        Ok(())
    }

    #[tokio::test]
    async fn one_review_per_pair_and_aggregates() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let seed = seed_marketplace(&db).await?;
        let sid = seed.service_ids[0];
        subscription_service::create(&db, NewSubscription { customer_id: seed.customer_id, service_id: sid }).await?;

        let r = create(&db, review_of(seed.customer_id, sid, 4)).await?;
        assert_eq!(r.customer_name, "Test Customer");
        assert!(matches!(create(&db, review_of(seed.customer_id, sid, 5)).await, Err(ServiceError::Conflict { .. })));

        let summary = average_rating(&db, sid).await?;
        assert_eq!((summary.average_rating, summary.review_count), (4.0, 1));
        let empty = average_rating(&db, seed.service_ids[1]).await?;
        assert_eq!((empty.average_rating, empty.review_count), (0.0, 0));

        let stats = provider_statistics(&db, seed.provider_id).await?;
        assert_eq!(stats.total_reviews, 1);
        assert_eq!(stats.rating_distribution[&4], 1);
        assert_eq!(stats.service_ratings.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn rating_out_of_range_is_rejected() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let seed = seed_marketplace(&db).await?;
        let sid = seed.service_ids[0];
        subscription_service::create(&db, NewSubscription { customer_id: seed.customer_id, service_id: sid }).await?;
        assert!(create(&db, review_of(seed.customer_id, sid, 6)).await.is_err());
        let r = create(&db, review_of(seed.customer_id, sid, 3)).await?;
        assert!(update(&db, r.id, ReviewUpdate { rating: 0, comment: "meh".into() }).await.is_err());
        let updated = update(&db, r.id, ReviewUpdate { rating: 5, comment: "better now".into() }).await?;
        assert_eq!(updated.rating, 5);
        Ok(())
    }

    #[tokio::test]
    async fn provider_response_sets_date() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let seed = seed_marketplace(&db).await?;
        let sid = seed.service_ids[0];
        subscription_service::create(&db, NewSubscription { customer_id: seed.customer_id, service_id: sid }).await?;
        let r = create(&db, review_of(seed.customer_id, sid, 2)).await?;
        assert!(r.provider_response.is_none());

        let answered = respond(&db, r.id, "Sorry, we'll make it right").await?;
        assert_eq!(answered.provider_response.as_deref(), Some("Sorry, we'll make it right"));
        assert!(answered.response_date.is_some());
        assert_eq!(list_by_provider(&db, seed.provider_id).await?.len(), 1);
        Ok(())
    }
}
