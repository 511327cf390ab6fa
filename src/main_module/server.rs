//! HTTP server initialization and routing

use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::core::middleware::require_company_middleware;
use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;
use crate::organizations::{configure_auth_routes, configure_employee_routes};
use crate::recordings::configure_recording_routes;
use crate::security::cors::create_cors_layer;

use super::{health_check, shutdown_signal};

pub fn build_router(app_state: Arc<AppState>) -> Router {
    let protected = configure_employee_routes().route_layer(middleware::from_fn_with_state(
        app_state.clone(),
        require_company_middleware,
    ));

    let cors = create_cors_layer(&app_state.config.cors_allowed_origins);

    Router::new()
        .route(ApiUrls::HEALTH, get(health_check))
        .merge(configure_auth_routes())
        .merge(configure_recording_routes())
        .merge(protected)
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(app_state: Arc<AppState>) -> std::io::Result<()> {
    let host = app_state.config.server.host.clone();
    let port = app_state.config.server.port;

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{e}")))?;

    let app = build_router(app_state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {addr}: {e} - is another instance running?");
            return Err(e);
        }
    };
    info!("HTTP server listening on {addr}");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(std::io::Error::other)
}
