use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use iwr_sdk::Relations;

use crate::handler;

/// Build the axum router with all relation endpoints. Other `/iwhd/...`
/// paths are relayed from the warehouse.
pub fn build_router(relations: Relations) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/iwhd", get(handler::index_handler))
        .route(
            "/iwhd/assemblies",
            get(handler::passthrough_handler).post(handler::record_assembly_handler),
        )
        .route(
            "/iwhd/deployables",
            get(handler::passthrough_handler).post(handler::record_deployable_handler),
        )
        .route("/iwhd/:collection/:id", get(handler::object_handler))
        .route("/iwhd/:collection/:id/parents", get(handler::parents_handler))
        .route("/iwhd/:collection/:id/children", get(handler::children_handler))
        .fallback(handler::passthrough_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(relations)
}
