use sqlx::prelude::FromRow;

/// One document per user, keyed by normalized email. The two arrays are
/// denormalized sets maintained by the friend state machine: `friends` holds
/// the emails of established friends, `friend_requests` the emails of users
/// with a pending request addressed to this user.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub email: String,
    pub username: Option<String>,
    pub hash_password: String,
    pub friends: Vec<String>,
    pub friend_requests: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
