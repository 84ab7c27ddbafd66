use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// One message in a channel's append-only log. Immutable once written apart
/// from the `is_read` flag, which the read-mark sweep flips in bulk.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MessageEntity {
    pub id: Uuid,
    pub channel_id: String,
    pub sender: String,
    pub recipient: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
