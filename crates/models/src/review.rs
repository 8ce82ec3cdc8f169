use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};
use crate::{customer, home_service};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub customer_id: i32,
    pub service_id: i32,
    pub rating: i32,
    #[sea_orm(column_type = "Text")]
    pub comment: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub provider_response: Option<String>,
    pub response_date: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Customer,
    Service,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Customer => Entity::belongs_to(customer::Entity).from(Column::CustomerId).to(customer::Column::Id).into(),
            Relation::Service => Entity::belongs_to(home_service::Entity).from(Column::ServiceId).to(home_service::Column::Id).into(),
        }
    }
}

impl Related<customer::Entity> for Entity {
    fn to() -> RelationDef { Relation::Customer.def() }
}

impl Related<home_service::Entity> for Entity {
    fn to() -> RelationDef { Relation::Service.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_rating(rating: i32) -> Result<(), ModelError> {
    if !(1..=5).contains(&rating) {
        return Err(ModelError::Validation("Rating must be between 1 and 5".into()));
    }
    Ok(())
}

pub fn validate_comment(comment: &str) -> Result<(), ModelError> {
    if comment.trim().is_empty() {
        return Err(ModelError::Validation("Comment is required".into()));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, customer_id: i32, service_id: i32, rating: i32, comment: &str) -> Result<Model, errors::ModelError> {
    validate_rating(rating)?;
    validate_comment(comment)?;
    let am = ActiveModel {
        customer_id: Set(customer_id),
        service_id: Set(service_id),
        rating: Set(rating),
        comment: Set(comment.trim().to_string()),
        provider_response: Set(None),
        response_date: Set(None),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_pair(db: &DatabaseConnection, customer_id: i32, service_id: i32) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::CustomerId.eq(customer_id))
        .filter(Column::ServiceId.eq(service_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
