//! In-memory fakes for the store adapter traits, shared by the service
//! tests. State lives behind plain mutexes; each fake holds a handle to the
//! same `InMemoryStore` so cross-collection effects (embedded sets vs.
//! request rows) stay observable.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::api::error;
use crate::modules::chat::channel::ChannelId;
use crate::modules::chat::model::InsertMessage;
use crate::modules::chat::repository::MessageRepository;
use crate::modules::chat::schema::MessageEntity;
use crate::modules::friend::repository::FriendRequestRepository;
use crate::modules::friend::schema::{FriendRequestEntity, RequestStatus};
use crate::modules::user::model::InsertUser;
use crate::modules::user::repository::UserRepository;
use crate::modules::user::schema::UserEntity;

#[derive(Clone, Default)]
pub struct InMemoryStore {
    users: Arc<Mutex<HashMap<String, UserEntity>>>,
    requests: Arc<Mutex<HashMap<String, FriendRequestEntity>>>,
    messages: Arc<Mutex<Vec<MessageEntity>>>,
}

fn blank_user(email: &str) -> UserEntity {
    UserEntity {
        email: email.to_string(),
        username: None,
        hash_password: "argon2-hash".to_string(),
        friends: Vec::new(),
        friend_requests: Vec::new(),
        created_at: chrono::Utc::now(),
    }
}

impl InMemoryStore {
    pub fn with_users(emails: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut users = store.users.lock().unwrap();
            for email in emails {
                users.insert(email.to_string(), blank_user(email));
            }
        }
        store
    }

    pub fn user(&self, email: &str) -> UserEntity {
        self.users.lock().unwrap().get(email).cloned().expect("user not seeded")
    }

    pub fn request(&self, id: &str) -> FriendRequestEntity {
        self.requests.lock().unwrap().get(id).cloned().expect("request not found")
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Seed an established friendship on both sides.
    pub fn link(&self, a: &str, b: &str) {
        let mut users = self.users.lock().unwrap();
        users.get_mut(a).expect("user not seeded").friends.push(b.to_string());
        users.get_mut(b).expect("user not seeded").friends.push(a.to_string());
    }

    /// Seed a one-sided friend entry, e.g. a dangling reference.
    pub fn push_friend(&self, user: &str, friend: &str) {
        self.users.lock().unwrap().get_mut(user).expect("user not seeded").friends.push(friend.to_string());
    }

    /// Seed a message with an explicit timestamp, bypassing the append path.
    pub fn push_message(
        &self,
        sender: &str,
        recipient: &str,
        content: &str,
        created_at: chrono::DateTime<chrono::Utc>,
    ) {
        let channel = ChannelId::between(sender, recipient).expect("invalid test pair");
        self.messages.lock().unwrap().push(MessageEntity {
            id: Uuid::now_v7(),
            channel_id: channel.as_str().to_string(),
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            content: content.to_string(),
            is_read: false,
            created_at,
        });
    }
}

#[derive(Clone)]
pub struct InMemoryUserRepo {
    store: InMemoryStore,
}

impl InMemoryUserRepo {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.store.users.lock().unwrap().get(email).cloned())
    }

    async fn create(&self, user: &InsertUser) -> Result<(), error::SystemError> {
        let mut users = self.store.users.lock().unwrap();
        if users.contains_key(&user.email) {
            return Err(error::SystemError::DuplicateKey(None));
        }
        let mut entity = blank_user(&user.email);
        entity.username = user.username.clone();
        entity.hash_password = user.hash_password.clone();
        users.insert(user.email.clone(), entity);
        Ok(())
    }

    async fn add_friend_request(&self, user: &str, from: &str) -> Result<(), error::SystemError> {
        let mut users = self.store.users.lock().unwrap();
        if let Some(entity) = users.get_mut(user) {
            if !entity.friend_requests.iter().any(|e| e == from) {
                entity.friend_requests.push(from.to_string());
            }
        }
        Ok(())
    }

    async fn remove_friend_request(
        &self,
        user: &str,
        other: &str,
    ) -> Result<(), error::SystemError> {
        let mut users = self.store.users.lock().unwrap();
        if let Some(entity) = users.get_mut(user) {
            entity.friend_requests.retain(|e| e != other);
        }
        Ok(())
    }

    async fn link_friend(&self, user: &str, other: &str) -> Result<(), error::SystemError> {
        let mut users = self.store.users.lock().unwrap();
        if let Some(entity) = users.get_mut(user) {
            if !entity.friends.iter().any(|e| e == other) {
                entity.friends.push(other.to_string());
            }
            entity.friend_requests.retain(|e| e != other);
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct InMemoryRequestRepo {
    store: InMemoryStore,
}

impl InMemoryRequestRepo {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for InMemoryRequestRepo {
    async fn find_by_id(
        &self,
        request_id: &str,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        Ok(self.store.requests.lock().unwrap().get(request_id).cloned())
    }

    async fn find_for_pair(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let id = FriendRequestEntity::derive_id(from, to);
        Ok(self.store.requests.lock().unwrap().get(&id).cloned())
    }

    async fn find_pending_to(
        &self,
        user: &str,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        Ok(self
            .store
            .requests
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.to_user == user && r.status == RequestStatus::Pending)
            .cloned()
            .collect())
    }

    async fn find_pending_from(
        &self,
        user: &str,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        Ok(self
            .store
            .requests
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.from_user == user && r.status == RequestStatus::Pending)
            .cloned()
            .collect())
    }

    async fn create_pending(
        &self,
        from: &str,
        to: &str,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request = FriendRequestEntity {
            id: FriendRequestEntity::derive_id(from, to),
            from_user: from.to_string(),
            to_user: to.to_string(),
            status: RequestStatus::Pending,
            created_at: chrono::Utc::now(),
        };
        self.store.requests.lock().unwrap().insert(request.id.clone(), request.clone());
        Ok(request)
    }

    async fn set_status(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> Result<(), error::SystemError> {
        if let Some(request) = self.store.requests.lock().unwrap().get_mut(request_id) {
            request.status = status;
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct InMemoryMessageRepo {
    store: InMemoryStore,
}

impl InMemoryMessageRepo {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl MessageRepository for InMemoryMessageRepo {
    async fn append(&self, message: &InsertMessage) -> Result<MessageEntity, error::SystemError> {
        let mut messages = self.store.messages.lock().unwrap();

        // Same clamp as the real store: never behind the channel maximum.
        let channel_max = messages
            .iter()
            .filter(|m| m.channel_id == message.channel_id)
            .map(|m| m.created_at)
            .max();
        let now = chrono::Utc::now();
        let created_at = channel_max.map_or(now, |max| max.max(now));

        let entity = MessageEntity {
            id: Uuid::now_v7(),
            channel_id: message.channel_id.clone(),
            sender: message.sender.clone(),
            recipient: message.recipient.clone(),
            content: message.content.clone(),
            is_read: false,
            created_at,
        };
        messages.push(entity.clone());
        Ok(entity)
    }

    async fn find_by_channel(
        &self,
        channel_id: &str,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        let mut messages: Vec<MessageEntity> = self
            .store
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.channel_id == channel_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }

    async fn mark_read(
        &self,
        channel_id: &str,
        recipient: &str,
    ) -> Result<u64, error::SystemError> {
        let mut updated = 0;
        for message in self.store.messages.lock().unwrap().iter_mut() {
            if message.channel_id == channel_id && message.recipient == recipient && !message.is_read
            {
                message.is_read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn count_unread(
        &self,
        channel_id: &str,
        recipient: &str,
    ) -> Result<i64, error::SystemError> {
        Ok(self
            .store
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.channel_id == channel_id && m.recipient == recipient && !m.is_read)
            .count() as i64)
    }
}

mod scenario {
    use super::*;
    use crate::modules::chat::service::ChatService;
    use crate::modules::friend::service::FriendService;

    const ALICE: &str = "alice@example.com";
    const BOB: &str = "bob@example.com";

    /// The whole happy path across both services on one store: request,
    /// inspect inbox, accept, symmetric friend lists, chat, read.
    #[tokio::test]
    async fn request_accept_chat_read_flow() {
        let store = InMemoryStore::with_users(&[ALICE, BOB]);
        let friends = FriendService::with_dependencies(
            Arc::new(InMemoryRequestRepo::new(store.clone())),
            Arc::new(InMemoryUserRepo::new(store.clone())),
        );
        let chat = ChatService::with_dependencies(
            Arc::new(InMemoryMessageRepo::new(store.clone())),
            Arc::new(InMemoryUserRepo::new(store.clone())),
            None,
        );

        let request = friends.send_friend_request(ALICE, BOB).await.unwrap();

        let inbox = friends.get_friend_requests(BOB).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].from_user, ALICE);
        assert_eq!(inbox[0].status, RequestStatus::Pending);

        friends.accept_friend_request(BOB, &request.id).await.unwrap();

        let alice_friends = friends.get_friends(ALICE).await.unwrap();
        let bob_friends = friends.get_friends(BOB).await.unwrap();
        assert_eq!(alice_friends.len(), 1);
        assert_eq!(alice_friends[0].email, BOB);
        assert_eq!(bob_friends.len(), 1);
        assert_eq!(bob_friends[0].email, ALICE);

        chat.send_message(ALICE, BOB, "hi").await.unwrap();

        let history = chat.get_chat(BOB, ALICE).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].sender, ALICE);
        assert_eq!(history[0].content, "hi");

        assert_eq!(chat.unread_count(BOB, ALICE).await.unwrap(), 1);
        chat.mark_messages_as_read(BOB, ALICE).await.unwrap();
        assert_eq!(chat.unread_count(BOB, ALICE).await.unwrap(), 0);
    }
}
