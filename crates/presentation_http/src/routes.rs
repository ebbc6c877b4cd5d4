//! Management controller route definitions

use axum::{Router, routing::get};

use crate::{handlers::route_spec, state::AppState};

/// Create the management controller router.
///
/// The controller is a single resource at `/`; any verb other than
/// GET, PUT, or DELETE gets a `405 Method Not Allowed` — unless the
/// addressing parameters are missing, which is rejected with `400`
/// first, verb regardless.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(route_spec::get_route_spec)
                .put(route_spec::set_route_spec)
                .delete(route_spec::delete_route_spec)
                .fallback(route_spec::method_not_allowed),
        )
        .with_state(state)
}
