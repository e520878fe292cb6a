use axum::{extract::Extension, http::Uri, middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use accesswash_portal::middleware::tenant::{tenant_filter, ResolvedTenant};
use accesswash_portal::tenant;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up APP_ENV, PORTAL_ROOT_DOMAIN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = accesswash_portal::config::config();
    tracing::info!("Starting AccessWash portal edge in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORTAL_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Portal edge listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/portal/context", get(portal_context))
        // Global middleware
        .layer(middleware::from_fn(tenant_filter))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "AccessWash Portal Edge",
            "version": version,
            "description": "Tenant-scoped edge router for the AccessWash customer portal",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public, unfiltered)",
                "context": "/portal/context (tenant-stamped)",
            }
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now()
        }
    }))
}

/// Report the tenant stamped by the edge filter. Downstream consumers may
/// rely on the stamp but must tolerate its absence, falling back to
/// URL-derived resolution.
async fn portal_context(resolved: Option<Extension<ResolvedTenant>>, uri: Uri) -> Json<Value> {
    let tenant = match resolved {
        Some(Extension(ResolvedTenant(tenant))) => tenant,
        None => tenant::resolve(None, uri.path()),
    };

    Json(json!({
        "success": true,
        "data": { "tenant": tenant }
    }))
}
