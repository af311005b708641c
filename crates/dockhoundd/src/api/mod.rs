//! HTTP/JSON + WebSocket façade over the Host Store.

mod dto;
mod http;
mod ws;

use axum::Router;
use axum::routing::get;
use dockhound_core::HostStore;
use tower_http::trace::TraceLayer;

/// Shared state handed to every axum handler: just a cheap [`HostStore`]
/// clone.
#[derive(Clone)]
pub struct AppState {
    pub store: HostStore,
}

/// Build the façade router.
#[must_use]
pub fn router(store: HostStore) -> Router {
    Router::new()
        .route("/api/v0/hosts", get(http::list_hosts))
        .route("/api/v0/hosts/ws", get(ws::upgrade))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { store })
}
