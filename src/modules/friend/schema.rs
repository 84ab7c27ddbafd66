use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};

#[derive(Debug, PartialEq, Clone, Type, Serialize, Deserialize)]
#[sqlx(type_name = "request_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

/// One directed friend request. The durable source of truth; the recipient's
/// embedded `friend_requests` set is a denormalized index kept in sync by
/// the state machine.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestEntity {
    pub id: String,
    pub from_user: String,
    pub to_user: String,
    pub status: RequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FriendRequestEntity {
    /// Deterministic id for the ordered (from, to) pair. `:` cannot appear
    /// in a normalized email, so distinct pairs never collide.
    pub fn derive_id(from: &str, to: &str) -> String {
        format!("{from}:{to}")
    }
}
