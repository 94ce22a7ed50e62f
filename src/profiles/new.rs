use axum::{debug_handler, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::{AppJson, AppResult};

use super::{create_profile, Profile};

#[derive(Debug, Deserialize)]
pub(crate) struct NewProfileRequest {
    name: String,
    avatar_url: Option<String>,
}

#[debug_handler]
pub(crate) async fn new_profile(
    State(db_pool): State<SqlitePool>,

    AppJson(NewProfileRequest { name, avatar_url }): AppJson<NewProfileRequest>,
) -> AppResult<(StatusCode, Json<Profile>)> {
    let profile = create_profile(&db_pool, &name, avatar_url.as_deref()).await?;
    info!(user_id = %profile.id, name = %profile.name, "created profile");

    Ok((StatusCode::CREATED, Json(profile)))
}
