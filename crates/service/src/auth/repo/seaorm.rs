use sea_orm::DatabaseConnection;

use crate::auth::domain::{AccountCredentials, Role};
use crate::auth::errors::AuthError;
use crate::auth::repository::AccountRepository;

pub struct SeaOrmAccountRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl AccountRepository for SeaOrmAccountRepository {
    async fn find_credentials(&self, role: Role, email: &str) -> Result<Option<AccountCredentials>, AuthError> {
        let res = match role {
            Role::Customer => models::customer::find_by_email(&self.db, email)
                .await
                .map_err(|e| AuthError::Repository(e.to_string()))?
                .map(|c| AccountCredentials { account_id: c.id, email: c.email, password_hash: c.password_hash }),
            Role::Provider => models::provider::find_by_email(&self.db, email)
                .await
                .map_err(|e| AuthError::Repository(e.to_string()))?
                .map(|p| AccountCredentials { account_id: p.id, email: p.email, password_hash: p.password_hash }),
        };
        Ok(res)
    }
}
