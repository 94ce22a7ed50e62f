use axum::{debug_handler, extract::State, Json};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{session, AppResult};

use super::{list_for_user, ChatSummary};

#[debug_handler]
pub(crate) async fn list_chats(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<Vec<ChatSummary>>> {
    let user_id = session::require_user(&session).await?;

    Ok(Json(list_for_user(&db_pool, &user_id).await?))
}
