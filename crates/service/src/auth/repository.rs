use async_trait::async_trait;

use super::domain::{AccountCredentials, Role};
use super::errors::AuthError;

/// Repository abstraction for credential lookups.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_credentials(&self, role: Role, email: &str) -> Result<Option<AccountCredentials>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAccountRepository {
        accounts: Mutex<HashMap<(Role, String), AccountCredentials>>, // key: (role, email)
    }

    impl MockAccountRepository {
        pub fn insert(&self, role: Role, account_id: i32, email: &str, password_hash: String) {
            let mut accounts = self.accounts.lock().unwrap();
            accounts.insert((role, email.to_string()), AccountCredentials { account_id, email: email.to_string(), password_hash });
        }
    }

    #[async_trait]
    impl AccountRepository for MockAccountRepository {
        async fn find_credentials(&self, role: Role, email: &str) -> Result<Option<AccountCredentials>, AuthError> {
            let accounts = self.accounts.lock().unwrap();
            Ok(accounts.get(&(role, email.to_string())).cloned())
        }
    }
}
