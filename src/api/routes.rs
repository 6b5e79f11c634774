//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    account_handler, create_link_handler, delete_account_handler, delete_link_handler,
    extend_link_handler, list_links_handler, reactivate_account_handler,
    resume_reactivation_handler, update_account_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `POST   /links`              - Create a short link
/// - `GET    /links`              - List the caller's live links (paginated)
/// - `POST   /links/{id}/extend`  - Push expiry back by seven days
/// - `DELETE /links/{id}`         - Permanently delete a link
/// - `GET    /account`            - Account status and deletion deadline
/// - `PATCH  /account`            - Change the display name
/// - `DELETE /account`            - Soft-delete the account and its links
/// - `POST   /account/reactivate` - Undo a soft delete
/// - `POST   /account/reactivate/resume` - Retry the link half of a reactivation
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/links", post(create_link_handler).get(list_links_handler))
        .route("/links/{id}/extend", post(extend_link_handler))
        .route("/links/{id}", delete(delete_link_handler))
        .route(
            "/account",
            get(account_handler)
                .patch(update_account_handler)
                .delete(delete_account_handler),
        )
        .route("/account/reactivate", post(reactivate_account_handler))
        .route(
            "/account/reactivate/resume",
            post(resume_reactivation_handler),
        )
}
