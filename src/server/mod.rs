pub mod upload;
pub mod ws;

use crate::hub::BroadcastHub;
use crate::store::FrameStore;
use axum::routing::{any, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FrameStore>,
    pub hub: Arc<BroadcastHub>,
}

/// The full HTTP surface: frame ingestion plus the event channel. Callers
/// are trusted producers, so cross-origin access is wide open by design.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(upload::upload))
        .route("/ws", any(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
