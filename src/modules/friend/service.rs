use std::sync::Arc;

use crate::{
    api::error,
    modules::{
        friend::{
            model::FriendResponse,
            repository::FriendRequestRepository,
            schema::{FriendRequestEntity, RequestStatus},
        },
        user::repository::UserRepository,
    },
    utils::normalize_email,
};

/// The friend-request state machine: NONE -> PENDING -> {ACCEPTED, REJECTED}.
///
/// Accept and reject each perform a fixed sequence of single-document
/// writes with no cross-document transaction; every sub-write is an
/// idempotent set operation, so the recovery policy for a partial failure
/// is to re-issue the whole command.
#[derive(Clone)]
pub struct FriendService<R, U>
where
    R: FriendRequestRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    request_repo: Arc<R>,
    user_repo: Arc<U>,
}

impl<R, U> FriendService<R, U>
where
    R: FriendRequestRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(request_repo: Arc<R>, user_repo: Arc<U>) -> Self {
        FriendService { request_repo, user_repo }
    }

    pub async fn send_friend_request(
        &self,
        sender: &str,
        recipient_email: &str,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let from = normalize_email(sender);
        let to = normalize_email(recipient_email);

        if from == to {
            return Err(error::SystemError::bad_request(
                "Cannot send a friend request to yourself",
            ));
        }

        if self.user_repo.find_by_email(&to).await?.is_none() {
            return Err(error::SystemError::not_found("User not found"));
        }

        if let Some(existing) = self.request_repo.find_for_pair(&from, &to).await? {
            if existing.status == RequestStatus::Pending {
                return Err(error::SystemError::conflict("Friend request already sent"));
            }
        }

        let request = self.request_repo.create_pending(&from, &to).await?;
        self.user_repo.add_friend_request(&to, &from).await?;

        Ok(request)
    }

    pub async fn accept_friend_request(
        &self,
        acting_user: &str,
        request_id: &str,
    ) -> Result<FriendResponse, error::SystemError> {
        let request = self
            .request_repo
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        if request.to_user != acting_user {
            return Err(error::SystemError::forbidden(
                "You are not allowed to accept this friend request",
            ));
        }

        if request.status != RequestStatus::Pending {
            return Err(error::SystemError::conflict("Friend request already resolved"));
        }

        // Three writes in a fixed order; each one is idempotent.
        self.request_repo.set_status(&request.id, RequestStatus::Accepted).await?;
        self.user_repo.link_friend(&request.to_user, &request.from_user).await?;
        self.user_repo.link_friend(&request.from_user, &request.to_user).await?;

        let from_user = self
            .user_repo
            .find_by_email(&request.from_user)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        Ok(FriendResponse::from(from_user))
    }

    pub async fn reject_friend_request(
        &self,
        acting_user: &str,
        request_id: &str,
    ) -> Result<(), error::SystemError> {
        let request = self
            .request_repo
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        if request.to_user != acting_user {
            return Err(error::SystemError::forbidden(
                "You are not allowed to reject this friend request",
            ));
        }

        if request.status != RequestStatus::Pending {
            return Err(error::SystemError::conflict("Friend request already resolved"));
        }

        self.request_repo.set_status(&request.id, RequestStatus::Rejected).await?;
        self.user_repo.remove_friend_request(&request.to_user, &request.from_user).await?;
        self.user_repo.remove_friend_request(&request.from_user, &request.to_user).await?;

        Ok(())
    }

    /// Resolves the caller's embedded friend set to public profiles.
    /// Entries that no longer resolve to a user document are dropped.
    pub async fn get_friends(
        &self,
        user: &str,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let entity = self
            .user_repo
            .find_by_email(user)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        let mut friends = Vec::with_capacity(entity.friends.len());
        for email in &entity.friends {
            if let Some(friend) = self.user_repo.find_by_email(email).await? {
                friends.push(FriendResponse::from(friend));
            }
        }

        Ok(friends)
    }

    pub async fn get_friend_requests(
        &self,
        user: &str,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        self.request_repo.find_pending_to(user).await
    }

    pub async fn get_sent_friend_requests(
        &self,
        user: &str,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        self.request_repo.find_pending_from(user).await
    }

    pub async fn find_friend(&self, email: &str) -> Result<FriendResponse, error::SystemError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(error::SystemError::bad_request("Email is required"));
        }

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        Ok(FriendResponse::from(user))
    }

    pub async fn is_friend(&self, user: &str, other: &str) -> Result<bool, error::SystemError> {
        let entity = self
            .user_repo
            .find_by_email(user)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        Ok(entity.friends.iter().any(|f| f == other))
    }
}
