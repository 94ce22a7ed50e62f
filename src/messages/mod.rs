mod history;
mod send;

use axum::{routing::{get, post}, Router};
use serde::Serialize;

use crate::{chats, presence, AppState};

pub use history::history;
pub use send::{send, Delivery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(send::send_message))
        .route("/chats", get(chats::list_chats))
        .route("/online", get(presence::online_users))
        .route("/{id}", get(history::message_history))
}

/// One entry in a conversation's log. Never edited once stored.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub text: String,
    pub created_at: i64,
}
