use serde::{Deserialize, Serialize};

/// Which account table a login targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Provider,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Provider => "provider",
        }
    }
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub role: Role,
    pub email: String,
    pub password: String,
}

/// Stored credentials for one account (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountCredentials {
    pub account_id: i32,
    pub email: String,
    pub password_hash: String,
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub account_id: i32,
    pub role: Role,
    pub token: Option<String>,
}

/// JWT claims carried by session tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub uid: i32,
    pub role: Role,
    pub exp: usize,
}
