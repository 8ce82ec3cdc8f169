use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use super::domain::{AuthSession, Claims, LoginInput, Role};
use super::errors::AuthError;
use super::repository::AccountRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: i64,
}

impl From<&configs::AuthConfig> for AuthConfig {
    fn from(cfg: &configs::AuthConfig) -> Self {
        let secret = cfg.jwt_secret.trim();
        Self {
            jwt_secret: (!secret.is_empty()).then(|| secret.to_string()),
            token_ttl_hours: cfg.token_ttl_hours,
        }
    }
}

/// Hash a plain-text password with Argon2 and a random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.is_empty() {
        return Err(AuthError::Validation("Password is required".into()));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::HashError(e.to_string()))
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// Auth business service independent of web framework
pub struct AuthService<R: AccountRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AccountRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Authenticate an account and optionally issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig, hash_password}, repository::mock::MockAccountRepository};
    /// use service::auth::domain::{LoginInput, Role};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAccountRepository::default());
    /// repo.insert(Role::Customer, 7, "u@e.com", hash_password("Passw0rd").unwrap());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: Some("secret".into()), token_ttl_hours: 12 });
    /// let input = LoginInput { role: Role::Customer, email: "u@e.com".into(), password: "Passw0rd".into() };
    /// let session = tokio_test::block_on(svc.login(input)).unwrap();
    /// assert_eq!(session.account_id, 7);
    /// assert!(session.token.is_some());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email, role = input.role.as_str()))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("Email and password are required".into()));
        }
        let cred = self.repo
            .find_credentials(input.role, input.email.trim())
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if !verify_password(&input.password, &cred.password_hash)? {
            debug!(account_id = cred.account_id, "password mismatch");
            return Err(AuthError::Unauthorized);
        }

        let token = match &self.cfg.jwt_secret {
            Some(_) => Some(self.issue_token(input.role, cred.account_id, &cred.email)?),
            None => None,
        };
        info!(account_id = cred.account_id, role = input.role.as_str(), "login_succeeded");
        Ok(AuthSession { account_id: cred.account_id, role: input.role, token })
    }

    pub fn issue_token(&self, role: Role, account_id: i32, email: &str) -> Result<String, AuthError> {
        let secret = self.cfg.jwt_secret.as_ref().ok_or_else(|| AuthError::TokenError("jwt secret not configured".into()))?;
        let exp = (chrono::Utc::now() + chrono::Duration::hours(self.cfg.token_ttl_hours)).timestamp() as usize;
        let claims = Claims { sub: email.to_string(), uid: account_id, role, exp };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let secret = self.cfg.jwt_secret.as_ref().ok_or_else(|| AuthError::TokenError("jwt secret not configured".into()))?;
        decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAccountRepository;

    fn svc_with(repo: Arc<MockAccountRepository>) -> AuthService<MockAccountRepository> {
        AuthService::new(repo, AuthConfig { jwt_secret: Some("test-secret".into()), token_ttl_hours: 12 })
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_email() {
        let repo = Arc::new(MockAccountRepository::default());
        repo.insert(Role::Provider, 3, "pro@example.com", hash_password("Right1").unwrap());
        let svc = svc_with(repo);

        let wrong = svc.login(LoginInput { role: Role::Provider, email: "pro@example.com".into(), password: "Wrong1".into() }).await;
        assert!(matches!(wrong, Err(AuthError::Unauthorized)));

        let unknown = svc.login(LoginInput { role: Role::Provider, email: "x@example.com".into(), password: "Right1".into() }).await;
        assert!(matches!(unknown, Err(AuthError::Unauthorized)));

        // customer table is separate from the provider table
        let cross = svc.login(LoginInput { role: Role::Customer, email: "pro@example.com".into(), password: "Right1".into() }).await;
        assert!(matches!(cross, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let svc = svc_with(Arc::new(MockAccountRepository::default()));
        let res = svc.login(LoginInput { role: Role::Customer, email: " ".into(), password: "x".into() }).await;
        assert!(matches!(res, Err(AuthError::Validation(_))));
    }

    #[test]
    fn token_round_trip_carries_claims() {
        let svc = svc_with(Arc::new(MockAccountRepository::default()));
        let token = svc.issue_token(Role::Customer, 42, "c@example.com").unwrap();
        let claims = svc.verify_token(&token).unwrap();
        assert_eq!(claims.uid, 42);
        assert_eq!(claims.role, Role::Customer);
        assert!(svc.verify_token("garbage").is_err());
    }

    #[test]
    fn no_secret_means_no_token() {
        let svc = AuthService::new(Arc::new(MockAccountRepository::default()), AuthConfig { jwt_secret: None, token_ttl_hours: 12 });
        assert!(svc.issue_token(Role::Customer, 1, "c@example.com").is_err());
    }

    #[test]
    fn hash_is_salted_and_verifies() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same", &a).unwrap());
        assert!(!verify_password("other", &a).unwrap());
        assert!(hash_password("").is_err());
    }
}
