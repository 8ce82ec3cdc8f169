use std::collections::BTreeSet;

use tracing::info;

use common::types::{CustomerView, NewReview, ReviewUpdate, ReviewView, ServiceView, SubscriptionView};

use crate::api::HomeConnectClient;
use crate::errors::ClientError;

/// A logged-in customer's view of their subscriptions and reviews.
///
/// Subscribing and unsubscribing patch the local list; review changes
/// reload both lists from the server.
#[derive(Debug, Clone)]
pub struct CustomerPortal {
    client: HomeConnectClient,
    customer: CustomerView,
    subscriptions: Vec<SubscriptionView>,
    reviews: Vec<ReviewView>,
}

impl CustomerPortal {
    pub async fn login(mut client: HomeConnectClient, email: &str, password: &str) -> Result<Self, ClientError> {
        let session = client.login_customer(email, password).await?;
        info!(customer_id = session.customer.id, "customer portal opened");
        let mut portal = Self::with_state(client, session.customer, Vec::new(), Vec::new());
        portal.reload().await?;
        Ok(portal)
    }

    pub(crate) fn with_state(
        client: HomeConnectClient,
        customer: CustomerView,
        subscriptions: Vec<SubscriptionView>,
        reviews: Vec<ReviewView>,
    ) -> Self {
        Self { client, customer, subscriptions, reviews }
    }

    pub fn customer(&self) -> &CustomerView {
        &self.customer
    }

    pub fn client(&self) -> &HomeConnectClient {
        &self.client
    }

    pub fn subscriptions(&self) -> &[SubscriptionView] {
        &self.subscriptions
    }

    pub fn reviews(&self) -> &[ReviewView] {
        &self.reviews
    }

    pub fn subscribed_service_ids(&self) -> BTreeSet<i32> {
        self.subscriptions.iter().map(|s| s.service.id).collect()
    }

    pub fn is_subscribed(&self, service_id: i32) -> bool {
        self.subscriptions.iter().any(|s| s.service.id == service_id)
    }

    pub fn review_for(&self, service_id: i32) -> Option<&ReviewView> {
        self.reviews.iter().find(|r| r.service_id == service_id)
    }

    /// Subscribed services without a review, in subscription order.
    pub fn unreviewed_services(&self) -> Vec<&ServiceView> {
        let reviewed: BTreeSet<i32> = self.reviews.iter().map(|r| r.service_id).collect();
        self.subscriptions
            .iter()
            .map(|s| &s.service)
            .filter(|s| !reviewed.contains(&s.id))
            .collect()
    }

    /// Refetch subscriptions and reviews concurrently.
    pub async fn reload(&mut self) -> Result<(), ClientError> {
        let id = self.customer.id;
        let (subs, reviews) = tokio::join!(self.client.customer_subscriptions(id), self.client.customer_reviews(id));
        self.subscriptions = subs?;
        self.reviews = reviews?;
        Ok(())
    }

    /// Fails with [`ClientError::AlreadySubscribed`] without calling the server
    /// when the service is already in the local list.
    pub async fn subscribe(&mut self, service_id: i32) -> Result<&SubscriptionView, ClientError> {
        if self.is_subscribed(service_id) {
            return Err(ClientError::AlreadySubscribed(service_id));
        }
        let sub = self.client.subscribe(self.customer.id, service_id).await?;
        info!(customer_id = self.customer.id, service_id, "subscribed");
        self.subscriptions.push(sub);
        Ok(&self.subscriptions[self.subscriptions.len() - 1])
    }

    pub async fn unsubscribe(&mut self, service_id: i32) -> Result<(), ClientError> {
        self.client.unsubscribe(self.customer.id, service_id).await?;
        self.subscriptions.retain(|s| s.service.id != service_id);
        info!(customer_id = self.customer.id, service_id, "unsubscribed");
        Ok(())
    }

    pub async fn create_review(&mut self, service_id: i32, rating: i32, comment: &str) -> Result<ReviewView, ClientError> {
        let input = NewReview { customer_id: self.customer.id, service_id, rating, comment: comment.to_string() };
        let review = self.client.create_review(&input).await?;
        self.reload().await?;
        Ok(review)
    }

    pub async fn update_review(&mut self, review_id: i32, rating: i32, comment: &str) -> Result<ReviewView, ClientError> {
        let changes = ReviewUpdate { rating, comment: comment.to_string() };
        let review = self.client.update_review(review_id, &changes).await?;
        self.reload().await?;
        Ok(review)
    }

    pub async fn delete_review(&mut self, review_id: i32) -> Result<(), ClientError> {
        self.client.delete_review(review_id).await?;
        self.reload().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use common::types::ProviderSummary;

    fn ts() -> common::types::Timestamp {
        DateTime::parse_from_rfc3339("2025-03-01T09:00:00+00:00").unwrap()
    }

    fn customer() -> CustomerView {
        CustomerView {
            id: 7,
            first_name: "Dana".into(),
            last_name: "Reyes".into(),
            email: "dana@example.com".into(),
            phone_number: "336-555-0101".into(),
            address: "Greensboro, NC".into(),
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn subscription(id: i32, service_id: i32) -> SubscriptionView {
        SubscriptionView {
            id,
            customer_id: 7,
            subscribed_at: ts(),
            service: ServiceView {
                id: service_id,
                name: format!("Service {service_id}"),
                description: None,
                price: 10.0,
                service_type: None,
                active: true,
                provider: ProviderSummary {
                    id: 1,
                    business_name: "Acme".into(),
                    first_name: "A".into(),
                    last_name: "B".into(),
                    address: "High Point, NC".into(),
                },
            },
        }
    }

    fn review(service_id: i32) -> ReviewView {
        ReviewView {
            id: 1,
            customer_id: 7,
            customer_name: "Dana Reyes".into(),
            service_id,
            service_name: format!("Service {service_id}"),
            rating: 5,
            comment: "Great".into(),
            created_at: ts(),
            provider_response: None,
            response_date: None,
        }
    }

    fn portal() -> CustomerPortal {
        // 不可达地址：任何网络调用都会失败
        let client = HomeConnectClient::new("http://127.0.0.1:9");
        CustomerPortal::with_state(client, customer(), vec![subscription(1, 10), subscription(2, 20), subscription(3, 30)], vec![review(20)])
    }

    #[tokio::test]
    async fn duplicate_subscribe_is_blocked_locally() {
        let mut p = portal();
        let err = p.subscribe(20).await.unwrap_err();
        assert!(matches!(err, ClientError::AlreadySubscribed(20)));
        assert_eq!(p.subscriptions().len(), 3);
    }

    #[tokio::test]
    async fn failed_unsubscribe_keeps_local_entry() {
        let mut p = portal();
        assert!(p.unsubscribe(10).await.is_err());
        assert!(p.is_subscribed(10));
    }

    #[test]
    fn unreviewed_keeps_subscription_order() {
        let p = portal();
        let ids: Vec<_> = p.unreviewed_services().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![10, 30]);
        assert_eq!(p.review_for(20).map(|r| r.rating), Some(5));
        assert_eq!(p.subscribed_service_ids().into_iter().collect::<Vec<_>>(), vec![10, 20, 30]);
    }
}
