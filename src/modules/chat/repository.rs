use crate::api::error;
use crate::modules::chat::{model::InsertMessage, schema::MessageEntity};

/// Store adapter for the per-channel message log.
#[async_trait::async_trait]
pub trait MessageRepository {
    /// Appends the message with a store-assigned timestamp that is
    /// monotonically non-decreasing within the channel.
    async fn append(&self, message: &InsertMessage) -> Result<MessageEntity, error::SystemError>;

    /// Full history in (created_at, id) ascending order — a stable total
    /// order even for equal timestamps.
    async fn find_by_channel(
        &self,
        channel_id: &str,
    ) -> Result<Vec<MessageEntity>, error::SystemError>;

    /// Bulk-marks unread messages addressed to `recipient` as read.
    /// Returns the number of messages updated.
    async fn mark_read(
        &self,
        channel_id: &str,
        recipient: &str,
    ) -> Result<u64, error::SystemError>;

    async fn count_unread(
        &self,
        channel_id: &str,
        recipient: &str,
    ) -> Result<i64, error::SystemError>;
}
