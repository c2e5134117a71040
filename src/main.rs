use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use ledger_api_rust::database::manager::DatabaseManager;
use ledger_api_rust::handlers;
use ledger_api_rust::middleware::auth::jwt_auth_middleware;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = ledger_api_rust::config::config();
    tracing::info!("Starting Ledger API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("LEDGER_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Ledger API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/auth/login", post(handlers::auth::login))
        // Protected listings
        .merge(api_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router {
    Router::new()
        .route(
            "/api/workspaces/:workspace_id/taxes",
            get(handlers::taxes::list_taxes),
        )
        .route(
            "/api/workspaces/:workspace_id/expenses",
            get(handlers::expenses::list_expenses),
        )
        .route(
            "/api/workspaces/:workspace_id/incomes",
            get(handlers::incomes::list_incomes),
        )
        .route(
            "/api/workspaces/:workspace_id/invoices",
            get(handlers::invoices::list_invoices),
        )
        .route(
            "/api/workspaces/:workspace_id/access-tokens",
            get(handlers::access_tokens::list_access_tokens),
        )
        .route("/api/users", get(handlers::users::list_users))
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Ledger API (Rust)",
        "version": version,
        "description": "Small-business accounting backend with multi-workspace support",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "login": "/api/auth/login (public - token acquisition)",
            "taxes": "/api/workspaces/:workspaceId/taxes (protected)",
            "expenses": "/api/workspaces/:workspaceId/expenses (protected)",
            "incomes": "/api/workspaces/:workspaceId/incomes (protected)",
            "invoices": "/api/workspaces/:workspaceId/invoices (protected)",
            "access_tokens": "/api/workspaces/:workspaceId/access-tokens (protected)",
            "users": "/api/users (protected, admin)",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
