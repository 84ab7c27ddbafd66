use crate::api::error;
use crate::modules::user::model::InsertUser;
use crate::modules::user::schema::UserEntity;

/// Store adapter for the `users` collection. All emails passed in are
/// expected to be normalized already.
///
/// The three set mutations are single-document writes and idempotent:
/// adding an email already in a set or removing one that is absent leaves
/// the document unchanged. The friend state machine relies on this to make
/// whole-operation retries safe after a partial failure.
#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError>;

    async fn create(&self, user: &InsertUser) -> Result<(), error::SystemError>;

    /// Set-union `from` into `user.friend_requests`.
    async fn add_friend_request(
        &self,
        user: &str,
        from: &str,
    ) -> Result<(), error::SystemError>;

    /// Set-difference `other` out of `user.friend_requests`.
    async fn remove_friend_request(
        &self,
        user: &str,
        other: &str,
    ) -> Result<(), error::SystemError>;

    /// Set-union `other` into `user.friends` and set-difference it out of
    /// `user.friend_requests`, as one document write. One half of the
    /// symmetric friendship; callers invoke it once per side.
    async fn link_friend(&self, user: &str, other: &str) -> Result<(), error::SystemError>;
}
