use anyhow::anyhow;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{db, profiles::{find_profile, Profile}, AppError, AppResult};

use super::{participant_pair, ChatSummary, Conversation, LatestMessage};

const CONVERSATION_COLUMNS: &str =
    "id,participant_lo,participant_hi,latest_text,latest_sender,latest_at,created_at";

#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: String,
    participant_lo: String,
    participant_hi: String,
    latest_text: Option<String>,
    latest_sender: Option<String>,
    latest_at: Option<i64>,
    created_at: i64,
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        let latest_message = match (row.latest_text, row.latest_sender) {
            (Some(text), Some(sender_id)) => Some(LatestMessage {
                text,
                sender_id,
                sent_at: row.latest_at.unwrap_or(row.created_at),
            }),
            _ => None,
        };

        Conversation {
            id: row.id,
            participants: [row.participant_lo, row.participant_hi],
            latest_message,
            created_at: row.created_at,
        }
    }
}

/// The conversation between `user_a` and `user_b`, in either order.
pub async fn find(db_pool: &SqlitePool, user_a: &str, user_b: &str) -> AppResult<Option<Conversation>> {
    let mut conn = db_pool.acquire().await?;
    find_on(&mut conn, user_a, user_b).await
}

pub(crate) async fn find_on(conn: &mut SqliteConnection, user_a: &str, user_b: &str) -> AppResult<Option<Conversation>> {
    let (lo, hi) = participant_pair(user_a, user_b);
    let row: Option<ConversationRow> = sqlx::query_as(&format!(
        "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE participant_lo=? AND participant_hi=?"
    ))
    .bind(lo)
    .bind(hi)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(Conversation::from))
}

/// Returns the pair's conversation, creating it on first use.
pub async fn get_or_create(db_pool: &SqlitePool, user_a: &str, user_b: &str) -> AppResult<Conversation> {
    let mut conn = db_pool.acquire().await?;
    get_or_create_on(&mut conn, user_a, user_b).await
}

/// Same as [`get_or_create`], on a connection the caller may hold a
/// transaction on.
///
/// The insert goes first so a transaction takes the write lock up front.
/// Two racing creators both hit the unique `(participant_lo, participant_hi)`
/// constraint; the loser's insert is a no-op and it reads the winner's row.
pub(crate) async fn get_or_create_on(conn: &mut SqliteConnection, user_a: &str, user_b: &str) -> AppResult<Conversation> {
    if user_a == user_b {
        return Err(AppError::invalid("a conversation needs two different users"));
    }

    let (lo, hi) = participant_pair(user_a, user_b);
    let id = Uuid::now_v7().to_string();
    let inserted = sqlx::query(
        "INSERT INTO conversations (id,participant_lo,participant_hi,created_at) VALUES (?,?,?,?) \
         ON CONFLICT (participant_lo,participant_hi) DO NOTHING",
    )
    .bind(&id)
    .bind(lo)
    .bind(hi)
    .bind(db::now_millis())
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if inserted == 0 {
        debug!(lo, hi, "conversation already exists");
    } else {
        info!(conversation_id = %id, lo, hi, "created conversation");
    }

    find_on(conn, lo, hi)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow!("conversation {lo}/{hi} missing after insert")))
}

/// Every conversation `user_id` is part of, with the counterpart's profile.
///
/// Rows come back in insertion order; there is no recency sort.
pub async fn list_for_user(db_pool: &SqlitePool, user_id: &str) -> AppResult<Vec<ChatSummary>> {
    let rows: Vec<ConversationRow> = sqlx::query_as(&format!(
        "SELECT {CONVERSATION_COLUMNS} FROM conversations \
         WHERE participant_lo=? OR participant_hi=? ORDER BY rowid"
    ))
    .bind(user_id)
    .bind(user_id)
    .fetch_all(db_pool)
    .await?;

    let mut chats = Vec::with_capacity(rows.len());
    for conversation in rows.into_iter().map(Conversation::from) {
        let counterpart = conversation.counterpart(user_id);
        let profile = find_profile(db_pool, counterpart)
            .await?
            .unwrap_or_else(|| Profile::unknown(counterpart));

        chats.push(ChatSummary {
            id: conversation.id,
            users: vec![profile],
            latest_message: conversation.latest_message,
            created_at: conversation.created_at,
        });
    }

    Ok(chats)
}
