use chrono::Utc;
use common::types::{ProviderSummary, ProviderView};
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, require, validate_email, ModelError};
use crate::home_service;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "provider")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub business_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: String,
    pub address: String,
    pub license_number: Option<String>,
    pub years_experience: Option<i32>,
    pub primary_service: Option<String>,
    pub active: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Service,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Service => Entity::has_many(home_service::Entity).into() }
    }
}

impl Related<home_service::Entity> for Entity {
    fn to() -> RelationDef { Relation::Service.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn summary(&self) -> ProviderSummary {
        ProviderSummary {
            id: self.id,
            business_name: self.business_name.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            address: self.address.clone(),
        }
    }
}

impl From<Model> for ProviderView {
    fn from(m: Model) -> Self {
        ProviderView {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            business_name: m.business_name,
            email: m.email,
            phone: m.phone,
            address: m.address,
            license_number: m.license_number,
            years_experience: m.years_experience,
            primary_service: m.primary_service,
            active: m.active,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProvider {
    pub first_name: String,
    pub last_name: String,
    pub business_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub license_number: Option<String>,
    pub years_experience: Option<i32>,
    pub primary_service: Option<String>,
    pub password_hash: String,
}

pub fn validate_years(years: Option<i32>) -> Result<(), ModelError> {
    match years {
        Some(y) if y < 0 => Err(ModelError::Validation("Years of experience cannot be negative".into())),
        _ => Ok(()),
    }
}

pub async fn create(db: &DatabaseConnection, input: NewProvider) -> Result<Model, errors::ModelError> {
    require("First name", &input.first_name)?;
    require("Last name", &input.last_name)?;
    require("Business name", &input.business_name)?;
    validate_email(&input.email)?;
    require("Phone", &input.phone)?;
    require("Address", &input.address)?;
    validate_years(input.years_experience)?;
    let am = ActiveModel {
        first_name: Set(input.first_name.trim().to_string()),
        last_name: Set(input.last_name.trim().to_string()),
        business_name: Set(input.business_name.trim().to_string()),
        email: Set(input.email.trim().to_string()),
        phone: Set(input.phone.trim().to_string()),
        address: Set(input.address.trim().to_string()),
        license_number: Set(input.license_number),
        years_experience: Set(input.years_experience),
        primary_service: Set(input.primary_service),
        active: Set(true),
        password_hash: Set(input.password_hash),
        created_at: Set(Utc::now().into()),
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
