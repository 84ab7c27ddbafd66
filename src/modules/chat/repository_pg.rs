use uuid::Uuid;

use crate::{
    api::error,
    modules::chat::{model::InsertMessage, repository::MessageRepository, schema::MessageEntity},
};

#[derive(Clone)]
pub struct MessageRepositoryPg {
    pool: sqlx::PgPool,
}

impl MessageRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageRepository for MessageRepositoryPg {
    async fn append(&self, message: &InsertMessage) -> Result<MessageEntity, error::SystemError> {
        let id = Uuid::now_v7();

        // The timestamp is clamped to the channel's current maximum so the
        // per-channel log never goes backwards, even across clock skew.
        let message = sqlx::query_as::<_, MessageEntity>(
            r#"
            INSERT INTO messages (id, channel_id, sender, recipient, content, created_at)
            VALUES (
                $1, $2, $3, $4, $5,
                GREATEST(
                    now(),
                    COALESCE((SELECT max(created_at) FROM messages WHERE channel_id = $2), now())
                )
            )
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&message.channel_id)
        .bind(&message.sender)
        .bind(&message.recipient)
        .bind(&message.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn find_by_channel(
        &self,
        channel_id: &str,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        // has index on (channel_id, created_at, id)
        let messages = sqlx::query_as::<_, MessageEntity>(
            "SELECT * FROM messages WHERE channel_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn mark_read(
        &self,
        channel_id: &str,
        recipient: &str,
    ) -> Result<u64, error::SystemError> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE
            WHERE channel_id = $1 AND recipient = $2 AND is_read = FALSE
            "#,
        )
        .bind(channel_id)
        .bind(recipient)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_unread(
        &self,
        channel_id: &str,
        recipient: &str,
    ) -> Result<i64, error::SystemError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT count(*)
            FROM messages
            WHERE channel_id = $1 AND recipient = $2 AND is_read = FALSE
            "#,
        )
        .bind(channel_id)
        .bind(recipient)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
