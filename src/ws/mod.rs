//! WebSocket entry point for live session feedback.
//!
//! A channel connects at `/ws/session_<id>`; any other channel segment is
//! closed right away with a policy-violation code and never registered.
//! Once accepted, inbound frames feed the telemetry router and outbound
//! feedback is drained from the viewer's registry queue.

use crate::http::AppState;
use crate::registry::{ViewerHandle, ViewerRegistry, SEND_QUEUE};
use crate::telemetry;
use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The session id a connect path maps to, or `None` for a rejected path.
/// The whole channel segment is the session id; it must carry the
/// `session_` prefix with a non-empty remainder.
pub fn parse_session_channel(channel: &str) -> Option<&str> {
    let rest = channel.strip_prefix("session_")?;
    if rest.is_empty() {
        return None;
    }
    Some(channel)
}

/// GET /ws/:channel
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(channel): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, channel, state.registry))
}

async fn handle_socket(mut socket: WebSocket, channel: String, registry: Arc<ViewerRegistry>) {
    let Some(session_id) = parse_session_channel(&channel).map(str::to_string) else {
        warn!(channel, "rejecting WebSocket connection on invalid path");
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: close_code::POLICY,
                reason: "invalid WebSocket path".into(),
            })))
            .await;
        return;
    };

    let viewer_id = format!("viewer_{}", uuid::Uuid::new_v4().simple());
    let (tx, mut rx) = mpsc::channel(SEND_QUEUE);
    registry
        .join(&session_id, ViewerHandle::new(viewer_id.clone(), tx))
        .await;
    info!(session_id, viewer = %viewer_id, "WebSocket connected");

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Writer: drain the registry queue into the socket. Exits when the
    // viewer is removed from the registry (sender dropped) or the socket
    // breaks.
    let writer = tokio::spawn(async move {
        while let Some(json) = rx.recv().await {
            if ws_tx.send(Message::Text((*json).clone())).await.is_err() {
                break;
            }
        }
    });

    // Reader: feed inbound frames to the telemetry router. A malformed
    // frame is dropped inside the router; only transport errors and an
    // explicit close end the loop.
    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                telemetry::route_frame(&registry, &session_id, &text).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(session_id, viewer = %viewer_id, error = %e, "WebSocket read error");
                break;
            }
        }
    }

    registry.leave(&session_id, &viewer_id).await;
    let _ = writer.await;
    info!(session_id, viewer = %viewer_id, "WebSocket disconnected");
}
