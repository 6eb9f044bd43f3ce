use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::ClaimPolicy;
use crate::config::{AppConfig, Environment};
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, require_claim};
use crate::services::{AuthService, ProviderService};

/// Shared handler state; every field is cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub providers: ProviderService,
    pub auth: AuthService,
    pub delete_policy: ClaimPolicy,
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes
        .merge(auth_public_routes())
        // Provider resource, auth applied per method
        .merge(provider_routes(&state))
        .with_state(state)
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/register", post(auth::register_post))
        .route("/login", post(auth::login_post))
}

fn provider_routes(state: &AppState) -> Router<AppState> {
    let jwt = from_fn_with_state(state.auth.tokens().clone(), jwt_auth_middleware);
    let remove_policy = from_fn_with_state(state.delete_policy.clone(), require_claim);

    // route_layer wraps only the method it is called on; the JWT layer is
    // added last so it runs before the claim check
    Router::new()
        .route("/provider", get(public::provider::list))
        .route("/provider", post(protected::provider::create).route_layer(jwt.clone()))
        .route("/provider/:id", get(public::provider::get))
        .route("/provider/:id", put(protected::provider::update).route_layer(jwt.clone()))
        .route(
            "/provider/:id",
            delete(protected::provider::delete)
                .route_layer(remove_policy)
                .route_layer(jwt),
        )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }
    if config.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Provider API",
            "version": version,
            "description": "Provider registry with bearer-token authentication",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/register, /login (public - token acquisition)",
                "provider": "GET /provider[/:id] (public); POST, PUT (bearer token); DELETE (bearer token with Provider=Remove claim)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.providers.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": true,
                    "code": "SERVICE_UNAVAILABLE",
                    "message": "Database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
