use std::sync::Arc;

use axum::{debug_handler, extract::{ws::{Message as WsMessage, WebSocket}, State, WebSocketUpgrade}, response::Response};
use futures_util::{SinkExt, StreamExt};
use tower_sessions::Session;
use tracing::{info, warn};

use crate::{session, AppResult, AppState};

use super::PresenceRegistry;

#[debug_handler(state = AppState)]
pub(crate) async fn presence_ws(
    State(presence): State<Arc<PresenceRegistry>>,
    session: Session,

    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let user_id = session::require_user(&session).await?;

    Ok(ws.on_upgrade(move |socket| serve_connection(presence, user_id, socket)))
}

async fn serve_connection(presence: Arc<PresenceRegistry>, user_id: String, socket: WebSocket) {
    let (connection_id, mut rx) = presence.connect(&user_id);
    info!(%user_id, %connection_id, "connected");

    let (mut sender, mut receiver) = socket.split();

    let mut push_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(%connection_id, error = %err, "dropping unserializable event");
                    continue;
                }
            };
            if sender.send(WsMessage::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    // clients don't talk back; just wait for them to go away
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let WsMessage::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut push_task => recv_task.abort(),
        _ = &mut recv_task => push_task.abort(),
    };

    presence.unregister(connection_id);
    info!(%user_id, %connection_id, "disconnected");
}
