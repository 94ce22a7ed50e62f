use axum::{debug_handler, extract::State, Json};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{profiles::{find_profile, Profile}, session, AppError, AppResult};

#[debug_handler]
pub(crate) async fn me(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<Profile>> {
    let user_id = session::require_user(&session).await?;

    find_profile(&db_pool, &user_id)
        .await?
        .map(Json)
        .ok_or(AppError::Unauthorized)
}
