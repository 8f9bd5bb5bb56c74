use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

/// Authenticated Router Module
///
/// Routes for callers holding a valid bearer token. The authentication layer
/// above this module guarantees every handler an `Identity`; the finer role
/// gates (contributor vs. elevated, owner-only edits) live in the handlers
/// because they depend on the target resource.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /users
        // Directory listing for admins and moderators. Moderators receive a
        // reduced projection without contact details.
        .route("/users", get(handlers::list_users))
        // PATCH /users/{id}
        // Partial profile update. Users may edit themselves; role and ban
        // changes inside the payload are admin-only.
        .route("/users/{id}", patch(handlers::update_user))
        // POST /news
        // Submits a new article. Always lands as a draft owned by the caller,
        // regardless of any status in the payload.
        .route("/news", post(handlers::create_news))
        // PATCH /news/{id}
        // Partial article edit. Authors may only edit their own articles, and
        // only admins/moderators may change the status field.
        // DELETE /news/{id}
        // Removes an article; admin/moderator only.
        .route(
            "/news/{id}",
            patch(handlers::update_news).delete(handlers::delete_news),
        )
        // POST /news/{id}/publish
        // The dedicated publish transition. Conflicts if already published.
        .route("/news/{id}/publish", post(handlers::publish_news))
}
