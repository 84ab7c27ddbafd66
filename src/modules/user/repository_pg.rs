use crate::{
    api::error,
    modules::user::{model::InsertUser, repository::UserRepository, schema::UserEntity},
};

#[derive(Clone)]
pub struct UserRepositoryPg {
    pool: sqlx::PgPool,
}

impl UserRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryPg {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create(&self, user: &InsertUser) -> Result<(), error::SystemError> {
        sqlx::query("INSERT INTO users (email, username, hash_password) VALUES ($1, $2, $3)")
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.hash_password)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn add_friend_request(&self, user: &str, from: &str) -> Result<(), error::SystemError> {
        sqlx::query(
            r#"
            UPDATE users
            SET friend_requests = CASE
                WHEN $2 = ANY(friend_requests) THEN friend_requests
                ELSE array_append(friend_requests, $2)
            END
            WHERE email = $1
            "#,
        )
        .bind(user)
        .bind(from)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_friend_request(
        &self,
        user: &str,
        other: &str,
    ) -> Result<(), error::SystemError> {
        sqlx::query(
            "UPDATE users SET friend_requests = array_remove(friend_requests, $2) WHERE email = $1",
        )
        .bind(user)
        .bind(other)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn link_friend(&self, user: &str, other: &str) -> Result<(), error::SystemError> {
        sqlx::query(
            r#"
            UPDATE users
            SET friends = CASE
                    WHEN $2 = ANY(friends) THEN friends
                    ELSE array_append(friends, $2)
                END,
                friend_requests = array_remove(friend_requests, $2)
            WHERE email = $1
            "#,
        )
        .bind(user)
        .bind(other)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
