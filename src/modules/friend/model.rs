use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::user::schema::UserEntity;

/// Public profile fields exposed to friends and friend-search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendResponse {
    pub email: String,
    pub username: String,
}

impl From<UserEntity> for FriendResponse {
    fn from(user: UserEntity) -> Self {
        FriendResponse {
            email: user.email,
            username: user.username.unwrap_or_else(|| "Anonymous".to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FriendRequestBody {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}
