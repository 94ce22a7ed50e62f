use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::info;

use crate::{profiles::{find_profile, Profile}, session::USER_ID, AppError, AppJson, AppResult};

#[derive(Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) user_id: String,
}

/// Binds an existing user to the session by id alone.
///
/// No credentials are checked: anyone who can reach this endpoint can act as
/// any user. It stands in for a real sign-in during development and must not
/// be exposed on a public port.
#[debug_handler]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,

    AppJson(LoginRequest { user_id }): AppJson<LoginRequest>,
) -> AppResult<Json<Profile>> {
    let Some(profile) = find_profile(&db_pool, &user_id).await? else {
        return Err(AppError::not_found("user not found"));
    };

    session.insert(USER_ID, &profile.id).await?;

    info!(user_id = %profile.id, "welcome {}", profile.name);
    Ok(Json(profile))
}
