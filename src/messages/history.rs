use axum::{debug_handler, extract::{Path, State}, Json};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{chats, session, AppError, AppResult};

use super::Message;

#[debug_handler]
pub(crate) async fn message_history(
    Path(counterpart_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<Vec<Message>>> {
    let user_id = session::require_user(&session).await?;

    Ok(Json(history(&db_pool, &user_id, &counterpart_id).await?))
}

/// All messages between the two users, oldest first. Unpaginated.
pub async fn history(db_pool: &SqlitePool, user_id: &str, counterpart_id: &str) -> AppResult<Vec<Message>> {
    let counterpart_id = chats::normalize_user_id(counterpart_id);
    let Some(conversation) = chats::find(db_pool, user_id, counterpart_id).await? else {
        return Err(AppError::not_found("no chat with user"));
    };

    Ok(
        sqlx::query_as::<_, Message>("SELECT id,conversation_id,sender_id,text,created_at FROM messages WHERE conversation_id=? ORDER BY seq")
            .bind(&conversation.id)
            .fetch_all(db_pool)
            .await?
    )
}
