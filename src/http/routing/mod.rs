pub mod todos;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub fn app(router: Router) -> Router {
    let api = Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .merge(router);
    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
}
