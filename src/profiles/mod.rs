mod new;
mod page;

use axum::{routing::{get, post}, Router};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{db, AppError, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/new", post(new::new_profile))
        .route("/{id}", get(page::profile))
}

/// Public profile fields of a user.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl Profile {
    /// Stand-in for a participant whose user record is gone.
    pub fn unknown(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: "Unknown user".to_owned(),
            avatar_url: None,
        }
    }
}

pub async fn create_profile(
    db_pool: &SqlitePool,
    name: &str,
    avatar_url: Option<&str>,
) -> AppResult<Profile> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::invalid("please give a name"));
    }

    let profile = Profile {
        id: Uuid::now_v7().to_string(),
        name: name.to_owned(),
        avatar_url: avatar_url.map(str::to_owned),
    };
    sqlx::query("INSERT INTO users (id,name,avatar_url,created_at) VALUES (?,?,?,?)")
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(&profile.avatar_url)
        .bind(db::now_millis())
        .execute(db_pool)
        .await?;

    Ok(profile)
}

pub async fn find_profile(db_pool: &SqlitePool, id: &str) -> AppResult<Option<Profile>> {
    Ok(
        sqlx::query_as::<_, Profile>("SELECT id,name,avatar_url FROM users WHERE id=?")
            .bind(id)
            .fetch_optional(db_pool)
            .await?
    )
}
