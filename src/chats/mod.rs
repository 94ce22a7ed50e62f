//! Conversations between exactly two users.

mod directory;
mod list;

use serde::Serialize;

use crate::profiles::Profile;

pub use directory::{find, get_or_create, list_for_user};
pub(crate) use directory::get_or_create_on;
pub(crate) use list::list_chats;

/// Denormalized copy of the newest message, for list views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestMessage {
    pub text: String,
    pub sender_id: String,
    pub sent_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    pub id: String,
    /// Sorted, so the same pair always reads the same way.
    pub participants: [String; 2],
    pub latest_message: Option<LatestMessage>,
    pub created_at: i64,
}

impl Conversation {
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    /// The other participant, from `user_id`'s point of view.
    pub fn counterpart(&self, user_id: &str) -> &str {
        let [lo, hi] = &self.participants;
        if lo == user_id { hi } else { lo }
    }
}

/// A conversation as its participant sees it in their chat list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatSummary {
    pub id: String,
    /// Everyone in the conversation except the viewer.
    pub users: Vec<Profile>,
    pub latest_message: Option<LatestMessage>,
    pub created_at: i64,
}

/// User ids as clients send them may carry stray whitespace.
pub(crate) fn normalize_user_id(user_id: &str) -> &str {
    user_id.trim()
}

/// Orders a pair so `(a, b)` and `(b, a)` share one key.
pub(crate) fn participant_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}
