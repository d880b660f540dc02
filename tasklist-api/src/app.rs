/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasklist_api::app::{build_router, AppState};
/// use tasklist_shared::notify::{EventPublisher, NotifyPolicy, RecordingNotifier};
/// use tasklist_shared::services::{IdentityConfig, IdentityService, TaskService};
/// use tasklist_shared::store::{MemoryAccountStore, MemoryTaskStore};
///
/// let events = EventPublisher::new(Arc::new(RecordingNotifier::new()), NotifyPolicy::Strict);
/// let identity = IdentityService::new(
///     Arc::new(MemoryAccountStore::new()),
///     events.clone(),
///     IdentityConfig::new("secret-key-that-is-at-least-32-bytes"),
/// );
/// let tasks = TaskService::new(Arc::new(MemoryTaskStore::new()), events);
///
/// let app = build_router(AppState::new(identity, tasks), &["*".to_string()]);
/// ```

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tasklist_shared::auth::middleware::require_bearer;
use tasklist_shared::services::{IdentityService, TaskService};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Registration, sign-in and token resolution
    pub identity: Arc<IdentityService>,

    /// Task lifecycle
    pub tasks: Arc<TaskService>,
}

impl AppState {
    /// Creates new application state
    pub fn new(identity: IdentityService, tasks: TaskService) -> Self {
        Self {
            identity: Arc::new(identity),
            tasks: Arc::new(tasks),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                 # Store liveness (public)
/// ├── /auth/                       # Identity (public)
/// │   ├── POST /sign-up
/// │   └── POST /sign-in
/// └── /api/                        # Bearer token required
///     ├── POST   /items            # Create
///     ├── GET    /items            # List
///     ├── POST   /items/bulk       # Bulk create
///     ├── GET    /items/:id        # Read
///     ├── PUT    /items/:id        # Replace fields
///     ├── PATCH  /items/:id        # Set done (?status=bool)
///     └── DELETE /items/:id        # Soft delete
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Bearer gate (`/api` routes only)
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/sign-up", post(routes::auth::sign_up))
        .route("/sign-in", post(routes::auth::sign_in));

    // Only matched routes pass through the gate, so unknown paths stay 404
    let item_routes = Router::new()
        .route(
            "/items",
            post(routes::items::create_item).get(routes::items::list_items),
        )
        .route("/items/bulk", post(routes::items::bulk_create_items))
        .route(
            "/items/:id",
            get(routes::items::get_item)
                .put(routes::items::update_item)
                .patch(routes::items::change_item_status)
                .delete(routes::items::delete_item),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.identity.clone(),
            require_bearer,
        ));

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .nest("/api", item_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// CORS policy for the configured origins
///
/// `*` anywhere in the list yields a permissive policy.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}
