use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a bearer token. The news read endpoints are
/// deliberately public: they serve the anonymous audience of the portal, and
/// the visibility filter inside the handlers keeps drafts and archived
/// articles out of anonymous responses.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /token
        // Exchanges a login/password form for a bearer token. Banned accounts
        // are refused here, not on every later request.
        .route("/token", post(handlers::login))
        // POST /users
        // Open registration. Unknown role ids in the payload are dropped.
        .route("/users", post(handlers::register_user))
        // GET /roles
        // The seeded role catalog, used by registration forms.
        .route("/roles", get(handlers::list_roles))
        // GET /news
        // Lists visible articles. Anonymous callers see published only; the
        // handler widens the scope for elevated and authoring callers.
        .route("/news", get(handlers::list_news))
        // GET /news/{id}
        // Single article view. Bumps the view counter on every visible read.
        .route("/news/{id}", get(handlers::get_news))
}
