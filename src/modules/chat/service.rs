use actix::Addr;
use std::sync::Arc;

use crate::{
    api::error,
    modules::{
        chat::{
            channel::ChannelId,
            model::InsertMessage,
            repository::MessageRepository,
            schema::MessageEntity,
        },
        user::repository::UserRepository,
        websocket::{events::BroadcastToChannel, message::ServerMessage, server::ChatServer},
    },
    utils::normalize_email,
};

/// The per-channel message log. History is the durable source of truth;
/// the WebSocket broadcast on top of it is best-effort live delivery, so a
/// missing server handle (tests) only drops the push, never the write.
#[derive(Clone)]
pub struct ChatService<M, U>
where
    M: MessageRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    message_repo: Arc<M>,
    user_repo: Arc<U>,
    ws_server: Option<Arc<Addr<ChatServer>>>,
}

impl<M, U> ChatService<M, U>
where
    M: MessageRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(
        message_repo: Arc<M>,
        user_repo: Arc<U>,
        ws_server: Option<Arc<Addr<ChatServer>>>,
    ) -> Self {
        ChatService { message_repo, user_repo, ws_server }
    }

    pub async fn send_message(
        &self,
        sender: &str,
        recipient_email: &str,
        content: &str,
    ) -> Result<MessageEntity, error::SystemError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(error::SystemError::bad_request("Message content cannot be empty"));
        }

        let sender = normalize_email(sender);
        let channel = ChannelId::between(&sender, recipient_email)?;
        let recipient = channel
            .peer_of(&sender)
            .ok_or_else(|| error::SystemError::bad_request("Invalid recipient"))?
            .to_string();

        if self.user_repo.find_by_email(&recipient).await?.is_none() {
            return Err(error::SystemError::not_found("User not found"));
        }

        let sender_entity = self
            .user_repo
            .find_by_email(&sender)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        // One side of the symmetric friend sets is enough to check; the
        // state machine maintains both together.
        if !sender_entity.friends.iter().any(|f| f == &recipient) {
            return Err(error::SystemError::forbidden("You can only chat with friends"));
        }

        let message = self
            .message_repo
            .append(&InsertMessage {
                channel_id: channel.as_str().to_string(),
                sender,
                recipient,
                content: content.to_string(),
            })
            .await?;

        self.broadcast(
            &channel,
            ServerMessage::NewMessage {
                channel_id: channel.as_str().to_string(),
                message: serde_json::to_value(&message).unwrap_or_default(),
            },
        );

        Ok(message)
    }

    pub async fn get_chat(
        &self,
        user: &str,
        recipient_email: &str,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        let channel = ChannelId::between(user, recipient_email)?;
        self.message_repo.find_by_channel(channel.as_str()).await
    }

    /// Best-effort bulk sweep: messages landing while the sweep runs stay
    /// unread until the next one.
    pub async fn mark_messages_as_read(
        &self,
        reader: &str,
        recipient_email: &str,
    ) -> Result<u64, error::SystemError> {
        let reader = normalize_email(reader);
        let channel = ChannelId::between(&reader, recipient_email)?;

        let updated = self.message_repo.mark_read(channel.as_str(), &reader).await?;

        if updated > 0 {
            self.broadcast(
                &channel,
                ServerMessage::MessagesRead {
                    channel_id: channel.as_str().to_string(),
                    reader: reader.clone(),
                },
            );
        }

        Ok(updated)
    }

    pub async fn unread_count(
        &self,
        reader: &str,
        recipient_email: &str,
    ) -> Result<i64, error::SystemError> {
        let reader = normalize_email(reader);
        let channel = ChannelId::between(&reader, recipient_email)?;
        self.message_repo.count_unread(channel.as_str(), &reader).await
    }

    fn broadcast(&self, channel: &ChannelId, message: ServerMessage) {
        if let Some(server) = &self.ws_server {
            server.do_send(BroadcastToChannel {
                channel_id: channel.clone(),
                message,
                skip_user: None,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{InMemoryMessageRepo, InMemoryStore, InMemoryUserRepo};

    fn service(store: &InMemoryStore) -> ChatService<InMemoryMessageRepo, InMemoryUserRepo> {
        ChatService::with_dependencies(
            Arc::new(InMemoryMessageRepo::new(store.clone())),
            Arc::new(InMemoryUserRepo::new(store.clone())),
            None,
        )
    }

    const ALICE: &str = "alice@example.com";
    const BOB: &str = "bob@example.com";
    const CAROL: &str = "carol@example.com";

    #[tokio::test]
    async fn empty_content_is_rejected() {
        let store = InMemoryStore::with_users(&[ALICE, BOB]);
        store.link(ALICE, BOB);
        let svc = service(&store);

        let err = svc.send_message(ALICE, BOB, "   ").await.unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));
    }

    #[tokio::test]
    async fn self_chat_is_rejected() {
        let store = InMemoryStore::with_users(&[ALICE]);
        let svc = service(&store);

        let err = svc.send_message(ALICE, ALICE, "hi").await.unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));
    }

    #[tokio::test]
    async fn non_friends_cannot_chat() {
        let store = InMemoryStore::with_users(&[ALICE, CAROL]);
        let svc = service(&store);

        let err = svc.send_message(ALICE, CAROL, "hi").await.unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));
    }

    #[tokio::test]
    async fn unknown_recipient_is_not_found() {
        let store = InMemoryStore::with_users(&[ALICE]);
        let svc = service(&store);

        let err = svc.send_message(ALICE, "nobody@example.com", "hi").await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }

    #[tokio::test]
    async fn both_parties_read_the_same_log() {
        let store = InMemoryStore::with_users(&[ALICE, BOB]);
        store.link(ALICE, BOB);
        let svc = service(&store);

        svc.send_message(ALICE, BOB, "hi").await.unwrap();
        svc.send_message(BOB, ALICE, "hey").await.unwrap();

        let from_alice = svc.get_chat(ALICE, BOB).await.unwrap();
        let from_bob = svc.get_chat(BOB, ALICE).await.unwrap();

        assert_eq!(from_alice.len(), 2);
        assert_eq!(from_alice[0].content, "hi");
        assert_eq!(from_alice[1].content, "hey");
        assert_eq!(
            from_alice.iter().map(|m| m.id).collect::<Vec<_>>(),
            from_bob.iter().map(|m| m.id).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn history_is_ordered_by_timestamp_then_id() {
        let store = InMemoryStore::with_users(&[ALICE, BOB]);
        store.link(ALICE, BOB);
        let svc = service(&store);

        // Seed the log out of insertion order to check the read-side sort.
        let base = chrono::Utc::now();
        store.push_message(ALICE, BOB, "third", base + chrono::Duration::seconds(2));
        store.push_message(BOB, ALICE, "first", base);
        store.push_message(ALICE, BOB, "second", base + chrono::Duration::seconds(1));

        let history = svc.get_chat(ALICE, BOB).await.unwrap();
        let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn equal_timestamps_break_ties_by_id() {
        let store = InMemoryStore::with_users(&[ALICE, BOB]);
        store.link(ALICE, BOB);
        let svc = service(&store);

        let at = chrono::Utc::now();
        store.push_message(ALICE, BOB, "a", at);
        store.push_message(ALICE, BOB, "b", at);
        store.push_message(ALICE, BOB, "c", at);

        let once = svc.get_chat(ALICE, BOB).await.unwrap();
        let twice = svc.get_chat(BOB, ALICE).await.unwrap();
        assert_eq!(
            once.iter().map(|m| m.id).collect::<Vec<_>>(),
            twice.iter().map(|m| m.id).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn mark_as_read_zeroes_unread_count() {
        let store = InMemoryStore::with_users(&[ALICE, BOB]);
        store.link(ALICE, BOB);
        let svc = service(&store);

        svc.send_message(ALICE, BOB, "one").await.unwrap();
        svc.send_message(ALICE, BOB, "two").await.unwrap();

        assert_eq!(svc.unread_count(BOB, ALICE).await.unwrap(), 2);
        // The sender has nothing addressed to them.
        assert_eq!(svc.unread_count(ALICE, BOB).await.unwrap(), 0);

        let updated = svc.mark_messages_as_read(BOB, ALICE).await.unwrap();
        assert_eq!(updated, 2);
        assert_eq!(svc.unread_count(BOB, ALICE).await.unwrap(), 0);

        // Sweeping again is a no-op.
        assert_eq!(svc.mark_messages_as_read(BOB, ALICE).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn appended_timestamps_never_regress() {
        let store = InMemoryStore::with_users(&[ALICE, BOB]);
        store.link(ALICE, BOB);
        let svc = service(&store);

        // A message already in the future of the wall clock.
        let ahead = chrono::Utc::now() + chrono::Duration::seconds(60);
        store.push_message(BOB, ALICE, "from the future", ahead);

        let appended = svc.send_message(ALICE, BOB, "now").await.unwrap();
        assert!(appended.created_at >= ahead);

        let history = svc.get_chat(ALICE, BOB).await.unwrap();
        assert_eq!(history.last().unwrap().content, "now");
    }
}
