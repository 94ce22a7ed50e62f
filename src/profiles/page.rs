use axum::{debug_handler, extract::{Path, State}, Json};
use sqlx::SqlitePool;

use crate::{AppError, AppResult};

use super::{find_profile, Profile};

#[debug_handler]
pub(crate) async fn profile(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<Profile>> {
    find_profile(&db_pool, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("user not found"))
}
