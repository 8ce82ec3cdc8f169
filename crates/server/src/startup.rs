use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use common::env::{check_database_scheme, ensure_database_dir};
use service::location::LocationService;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Connect the database (migrating when enabled), wire services into
/// [`ServerState`] and build the router.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    check_database_scheme(&cfg.database.url);
    ensure_database_dir(&cfg.database.url)
        .await
        .map_err(|e| StartupError::Database(format!("data directory: {e}")))?;

    let db = if cfg.database.run_migrations {
        models::db::connect_and_migrate(&cfg.database).await
    } else {
        models::db::connect_with_config(&cfg.database).await
    }
    .map_err(|e| StartupError::Database(e.to_string()))?;

    let location = LocationService::from_config(&cfg.location);
    let state = ServerState::new(db, &cfg.auth, location);
    info!(require_token = cfg.auth.require_token, "application state ready");
    Ok(routes::build_router(state, build_cors()))
}

/// Public entry: build the app and serve until the listener fails.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let addr = bind_addr(&cfg)?;
    let app = build_app(&cfg).await?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "homeconnect api listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_rejects_bad_host() {
        let mut cfg = AppConfig::default();
        cfg.server.host = "not a host".into();
        assert!(matches!(bind_addr(&cfg), Err(StartupError::InvalidConfig(_))));
        cfg.server.host = "0.0.0.0".into();
        assert_eq!(bind_addr(&cfg).unwrap().port(), 8080);
    }
}
