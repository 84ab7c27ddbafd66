use crate::api::error;
use crate::modules::friend::schema::{FriendRequestEntity, RequestStatus};

/// Store adapter for the `friend_requests` collection.
#[async_trait::async_trait]
pub trait FriendRequestRepository {
    async fn find_by_id(
        &self,
        request_id: &str,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    /// The request for the ordered (from, to) pair, in whatever status.
    async fn find_for_pair(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn find_pending_to(
        &self,
        user: &str,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError>;

    async fn find_pending_from(
        &self,
        user: &str,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError>;

    /// Creates the PENDING request for the pair. A previously resolved
    /// request for the same pair is reset to a fresh PENDING one (re-request
    /// after rejection is allowed).
    async fn create_pending(
        &self,
        from: &str,
        to: &str,
    ) -> Result<FriendRequestEntity, error::SystemError>;

    async fn set_status(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> Result<(), error::SystemError>;
}
