use chrono::Utc;
use common::types::CustomerView;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, require, validate_email, ModelError};
use crate::{review, subscription};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone_number: String,
    pub address: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Subscription,
    Review,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Subscription => Entity::has_many(subscription::Entity).into(),
            Relation::Review => Entity::has_many(review::Entity).into(),
        }
    }
}

impl Related<subscription::Entity> for Entity {
    fn to() -> RelationDef { Relation::Subscription.def() }
}

impl Related<review::Entity> for Entity {
    fn to() -> RelationDef { Relation::Review.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl From<Model> for CustomerView {
    fn from(m: Model) -> Self {
        CustomerView {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            phone_number: m.phone_number,
            address: m.address,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Row values for a new customer; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub password_hash: String,
}

pub fn validate_profile(first_name: &str, last_name: &str, email: &str, phone_number: &str, address: &str) -> Result<(), ModelError> {
    require("First name", first_name)?;
    require("Last name", last_name)?;
    validate_email(email)?;
    require("Phone number", phone_number)?;
    require("Address", address)?;
    Ok(())
}

pub async fn create(db: &DatabaseConnection, input: NewCustomer) -> Result<Model, errors::ModelError> {
    validate_profile(&input.first_name, &input.last_name, &input.email, &input.phone_number, &input.address)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        first_name: Set(input.first_name.trim().to_string()),
        last_name: Set(input.last_name.trim().to_string()),
        email: Set(input.email.trim().to_string()),
        phone_number: Set(input.phone_number.trim().to_string()),
        address: Set(input.address.trim().to_string()),
        password_hash: Set(input.password_hash),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Email.eq(email.trim()))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
