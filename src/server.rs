//! HTTP server and routes.

mod handlers;
mod state;

pub use handlers::WELCOME;
pub use state::AppState;

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let trailing_slash_routes = Router::new()
        .route("/books/", get(handlers::strip_trailing_slash))
        .route("/chapters/", get(handlers::strip_trailing_slash))
        .route("/chapter/", get(handlers::strip_trailing_slash));

    Router::new()
        .route("/", get(handlers::index))
        .route("/books", get(handlers::list_books))
        .route("/chapters", get(handlers::list_chapters))
        .route("/chapter", get(handlers::get_chapter))
        .merge(trailing_slash_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
