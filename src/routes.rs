use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::{
    handlers::{
        add_item_page, add_item_submit, delete_item_handler, edit_item_page, edit_item_submit,
        export_handler, index_handler, login_page, login_submit, logout_handler, register_page,
        register_submit, AppState,
    },
    session::require_auth,
};

/// Builds the full application router.
///
/// Everything except login and registration sits behind `require_auth`.
pub fn app(state: AppState, session_layer: SessionManagerLayer<MemoryStore>) -> Router {
    let protected = Router::new()
        .route("/", get(index_handler))
        .route("/logout", get(logout_handler))
        .route("/item/add", get(add_item_page).post(add_item_submit))
        .route("/item/edit/:id", get(edit_item_page).post(edit_item_submit))
        .route("/item/delete/:id", post(delete_item_handler))
        .route("/export", get(export_handler))
        .route_layer(middleware::from_fn(require_auth));

    Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/register", get(register_page).post(register_submit))
        .merge(protected)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(session_layer),
        )
}
