use crate::{
    api::error,
    modules::friend::{
        repository::FriendRequestRepository,
        schema::{FriendRequestEntity, RequestStatus},
    },
};

#[derive(Clone)]
pub struct FriendRequestRepositoryPg {
    pool: sqlx::PgPool,
}

impl FriendRequestRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for FriendRequestRepositoryPg {
    async fn find_by_id(
        &self,
        request_id: &str,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            "SELECT * FROM friend_requests WHERE id = $1",
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_for_pair(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            "SELECT * FROM friend_requests WHERE from_user = $1 AND to_user = $2",
        )
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_pending_to(
        &self,
        user: &str,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        let requests = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE to_user = $1 AND status = 'PENDING'
            ORDER BY created_at DESC
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn find_pending_from(
        &self,
        user: &str,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        let requests = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE from_user = $1 AND status = 'PENDING'
            ORDER BY created_at DESC
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn create_pending(
        &self,
        from: &str,
        to: &str,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let id = FriendRequestEntity::derive_id(from, to);

        // Re-requesting after a terminal status reuses the row.
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            INSERT INTO friend_requests (id, from_user, to_user, status)
            VALUES ($1, $2, $3, 'PENDING')
            ON CONFLICT (id)
            DO UPDATE SET status = 'PENDING', created_at = now()
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    async fn set_status(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> Result<(), error::SystemError> {
        sqlx::query("UPDATE friend_requests SET status = $2 WHERE id = $1")
            .bind(request_id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
