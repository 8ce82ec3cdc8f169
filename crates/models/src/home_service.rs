//! Priced offerings published by providers (table `service`).
use chrono::Utc;
use common::types::ServiceView;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, require, ModelError};
use crate::{provider, review, subscription};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub provider_id: i32,
    pub name: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub service_type: Option<String>,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Provider,
    Subscription,
    Review,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Provider => Entity::belongs_to(provider::Entity).from(Column::ProviderId).to(provider::Column::Id).into(),
            Relation::Subscription => Entity::has_many(subscription::Entity).into(),
            Relation::Review => Entity::has_many(review::Entity).into(),
        }
    }
}

impl Related<provider::Entity> for Entity {
    fn to() -> RelationDef { Relation::Provider.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_view(self, owner: &provider::Model) -> ServiceView {
        ServiceView {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
            service_type: self.service_type,
            active: self.active,
            provider: owner.summary(),
        }
    }
}

pub fn validate_price(price: f64) -> Result<(), ModelError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ModelError::Validation("Price must be a non-negative number".into()));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct NewHomeService {
    pub provider_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub service_type: Option<String>,
    pub active: bool,
}

pub async fn create(db: &DatabaseConnection, input: NewHomeService) -> Result<Model, errors::ModelError> {
    require("Service name", &input.name)?;
    validate_price(input.price)?;
    let am = ActiveModel {
        provider_id: Set(input.provider_id),
        name: Set(input.name.trim().to_string()),
        description: Set(input.description),
        price: Set(input.price),
        service_type: Set(input.service_type),
        active: Set(input.active),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
