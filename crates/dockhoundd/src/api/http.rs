//! `GET /api/v0/hosts` — the global-unicast-filtered host table as JSON.

use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use dockhound_core::{HostId, public_view};

use super::{AppState, dto::HostView};

pub async fn list_hosts(State(state): State<AppState>) -> Json<HashMap<HostId, HostView>> {
    let snapshot = state.store.snapshot();
    let view = public_view(&snapshot)
        .iter()
        .map(|(id, host)| (id.clone(), HostView::from(host)))
        .collect();
    Json(view)
}
