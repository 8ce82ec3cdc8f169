use std::sync::Arc;

use sea_orm::DatabaseConnection;
use service::auth::repo::seaorm::SeaOrmAccountRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::location::LocationService;

pub type ServerAuth = AuthService<SeaOrmAccountRepository>;

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<ServerAuth>,
    pub location: Arc<LocationService>,
    /// Reject API calls without a valid bearer token.
    pub require_token: bool,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, auth_cfg: &configs::AuthConfig, location: LocationService) -> Self {
        let repo = Arc::new(SeaOrmAccountRepository { db: db.clone() });
        let auth = AuthService::new(repo, AuthConfig::from(auth_cfg));
        Self { db, auth: Arc::new(auth), location: Arc::new(location), require_token: auth_cfg.require_token }
    }
}
