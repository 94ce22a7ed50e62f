use std::sync::Arc;

use axum::{debug_handler, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{chats, db, presence::{ConnectionId, PresenceEvent, PresenceRegistry, PushError}, session, AppError, AppJson, AppResult, AppState};

use super::Message;

#[derive(Deserialize)]
pub(crate) struct SendMessageRequest {
    recipient_id: Option<String>,
    #[serde(default)]
    text: String,
}

/// Outcome of the live push that follows a stored message.
#[derive(Debug)]
pub enum Delivery {
    Pushed(ConnectionId),
    Offline,
    Failed(PushError),
}

#[debug_handler(state = AppState)]
pub(crate) async fn send_message(
    State(db_pool): State<SqlitePool>,
    State(presence): State<Arc<PresenceRegistry>>,
    session: Session,

    AppJson(SendMessageRequest { recipient_id, text }): AppJson<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let sender_id = session::require_user(&session).await?;
    let message = send(&db_pool, &presence, &sender_id, recipient_id.as_deref(), &text).await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Stores a message from `sender_id` to `recipient_id` and pushes it to the
/// recipient if they are online.
///
/// Creating the conversation, storing the message and updating the latest
/// message summary commit together, before any push is attempted. Push
/// failures never reach the caller. Retrying after a lost response can store the
/// message twice.
pub async fn send(
    db_pool: &SqlitePool,
    presence: &PresenceRegistry,

    sender_id: &str,
    recipient_id: Option<&str>,
    text: &str,
) -> AppResult<Message> {
    let recipient_id = recipient_id
        .map(chats::normalize_user_id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::invalid("please give receiver id"))?;

    let mut tx = db_pool.begin().await?;
    let conversation = chats::get_or_create_on(&mut tx, sender_id, recipient_id).await?;

    let message = Message {
        id: Uuid::now_v7().to_string(),
        conversation_id: conversation.id,
        sender_id: sender_id.to_owned(),
        text: text.to_owned(),
        created_at: db::now_millis(),
    };

    sqlx::query("INSERT INTO messages (id,conversation_id,sender_id,text,created_at) VALUES (?,?,?,?,?)")
        .bind(&message.id)
        .bind(&message.conversation_id)
        .bind(&message.sender_id)
        .bind(&message.text)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE conversations SET latest_text=?,latest_sender=?,latest_at=? WHERE id=?")
        .bind(&message.text)
        .bind(&message.sender_id)
        .bind(message.created_at)
        .bind(&message.conversation_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(message_id = %message.id, conversation_id = %message.conversation_id, sender_id, recipient_id, "stored message");

    match deliver(presence, recipient_id, &message) {
        Delivery::Pushed(connection_id) => debug!(recipient_id, %connection_id, "pushed message"),
        Delivery::Offline => debug!(recipient_id, "recipient offline, not pushing"),
        Delivery::Failed(err) => warn!(recipient_id, error = %err, "live push failed"),
    }

    Ok(message)
}

pub(crate) fn deliver(presence: &PresenceRegistry, recipient_id: &str, message: &Message) -> Delivery {
    let Some(connection_id) = presence.lookup(recipient_id) else {
        return Delivery::Offline;
    };

    match presence.push(connection_id, PresenceEvent::NewMessage(message.clone())) {
        Ok(()) => Delivery::Pushed(connection_id),
        Err(err) => Delivery::Failed(err),
    }
}
