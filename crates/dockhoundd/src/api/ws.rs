//! WebSocket façade: subscribe, replay the current global-unicast snapshot
//! as `add` frames, then forward live `add`/`remove` events until the
//! client disconnects.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use dockhound_core::{is_global_unicast, public_view};
use serde_json::json;

use super::{AppState, dto::HostView};

pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    // Subscribe before taking the snapshot: any addition that races the
    // snapshot is delivered twice rather than dropped, per the ordering
    // note this façade is required to implement.
    let mut subscription = match state.store.subscribe().await {
        Ok(subscription) => subscription,
        Err(error) => {
            tracing::warn!(%error, "websocket client could not subscribe");
            return;
        }
    };

    let snapshot = state.store.snapshot();
    for (id, host) in public_view(&snapshot) {
        let frame = json!({"type": "add", "id": id, "host": HostView::from(&host)});
        if send(&mut socket, &frame).await.is_err() {
            subscription.unsubscribe().await;
            return;
        }
    }

    loop {
        tokio::select! {
            added = subscription.on_add.recv() => {
                let Some(host) = added else { break };
                if !is_global_unicast(host.address) {
                    continue;
                }
                let frame = json!({"type": "add", "id": host.id, "host": HostView::from(&host)});
                if send(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
            removed = subscription.on_remove.recv() => {
                let Some(id) = removed else { break };
                let frame = json!({"type": "remove", "id": id});
                if send(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                if incoming.is_none() {
                    break;
                }
            }
        }
    }

    subscription.unsubscribe().await;
}

async fn send(socket: &mut WebSocket, frame: &serde_json::Value) -> Result<(), axum::Error> {
    socket.send(Message::Text(frame.to_string().into())).await
}
