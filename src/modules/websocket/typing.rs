/// Typing presence signal.
///
/// Ephemeral, overwrite-in-place state in Redis: one key per
/// (channel, user), last writer wins, expired by TTL rather than cleaned
/// up explicitly. A client that disconnects mid-keystroke simply stops
/// refreshing the key. Debouncing is the caller's job; nothing here rate
/// limits.
///
/// Redis key schema:
/// - `typing:{channel_id}:{email}` -> "1" (TTL 10s)
use deadpool_redis::redis::AsyncCommands;

use crate::api::error;
use crate::modules::chat::channel::ChannelId;

/// TTL for a typing key. Clients refresh while the user keeps typing; a
/// stale key expires on its own.
const TYPING_TTL: u64 = 10;

const TYPING_PREFIX: &str = "typing:";

#[derive(Clone)]
pub struct TypingService {
    pool: deadpool_redis::Pool,
}

impl TypingService {
    pub fn new(pool: deadpool_redis::Pool) -> Self {
        Self { pool }
    }

    fn key(channel_id: &ChannelId, email: &str) -> String {
        format!("{TYPING_PREFIX}{channel_id}:{email}")
    }

    pub async fn set_typing(
        &self,
        channel_id: &ChannelId,
        email: &str,
        typing: bool,
    ) -> Result<(), error::SystemError> {
        let mut conn = self.pool.get().await?;
        let key = Self::key(channel_id, email);

        if typing {
            conn.set_ex::<_, _, ()>(&key, "1", TYPING_TTL).await?;
        } else {
            conn.del::<_, ()>(&key).await?;
        }

        Ok(())
    }

    pub async fn is_typing(
        &self,
        channel_id: &ChannelId,
        email: &str,
    ) -> Result<bool, error::SystemError> {
        let mut conn = self.pool.get().await?;
        let exists: bool = conn.exists(Self::key(channel_id, email)).await?;
        Ok(exists)
    }
}
