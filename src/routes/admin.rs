use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, patch},
};

/// Admin Router Module
///
/// Account moderation endpoints, admin role only. The handlers re-check the
/// role themselves, so a route accidentally mounted outside the admin layer
/// still refuses non-admin callers.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // DELETE /users/{id}
        // Hard-deletes an account. Role links cascade; authored articles stay
        // behind without an owner.
        .route("/users/{id}", delete(handlers::delete_user))
        // PATCH /users/{id}/ban
        // Flips the ban flag. Self-ban is refused; a no-op flip returns the
        // current record.
        .route("/users/{id}/ban", patch(handlers::set_user_ban))
}
