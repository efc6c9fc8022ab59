use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::DeploymentImpl;

pub mod case_events;
pub mod cases;
pub mod directory;
pub mod notifications;

pub fn router(deployment: DeploymentImpl) -> Router {
    let api_routes = Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(directory::router(&deployment))
        .merge(cases::router(&deployment))
        .merge(case_events::router(&deployment))
        .merge(notifications::router(&deployment));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(deployment)
}
