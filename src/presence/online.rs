use std::sync::Arc;

use axum::{debug_handler, extract::State, Json};

use super::PresenceRegistry;

#[debug_handler]
pub(crate) async fn online_users(
    State(presence): State<Arc<PresenceRegistry>>,
) -> Json<Vec<String>> {
    Json(presence.online_users())
}
