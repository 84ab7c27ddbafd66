use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::ENV;
use crate::api::error;
use crate::configs::RedisCache;

use crate::modules::user::model::{InsertUser, SignInModel, SignUpModel, UserResponse};
use crate::modules::user::repository::UserRepository;
use crate::utils::{Claims, TypeClaims, hash_password, normalize_email, verify_password};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
    cache: Arc<RedisCache>,
}

impl UserService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository + Send + Sync>,
        cache: Arc<RedisCache>,
    ) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo, cache }
    }

    pub async fn get_profile(&self, email: &str) -> Result<UserResponse, error::SystemError> {
        let key = format!("user:{email}");
        if let Some(cached) = self.cache.get::<UserResponse>(&key).await? {
            return Ok(cached);
        }

        let entity = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        let response = UserResponse::from(entity);
        self.cache.set(&key, &response, 3600).await?;
        Ok(response)
    }

    pub async fn sign_up(&self, user: SignUpModel) -> Result<String, error::SystemError> {
        let email = normalize_email(&user.email);
        let hash_password = hash_password(&user.password)?;

        let new_user = InsertUser { email: email.clone(), username: user.username, hash_password };

        // Duplicate emails surface as a unique-key violation from the store.
        self.repo.create(&new_user).await?;
        Ok(email)
    }

    pub async fn sign_in(&self, user: SignInModel) -> Result<(String, String), error::SystemError> {
        let email = normalize_email(&user.email);

        let entity = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Invalid email or password"))?;

        let valid = verify_password(&entity.hash_password, &user.password)?;
        if !valid {
            return Err(error::SystemError::unauthorized("Invalid email or password"));
        }

        self.issue_tokens(&entity.email).await
    }

    pub async fn refresh(
        &self,
        refresh_token: Option<String>,
    ) -> Result<(String, String), error::SystemError> {
        let token = refresh_token
            .ok_or_else(|| error::SystemError::unauthorized("Refresh token missing"))?;

        let claims = Claims::decode(&token, ENV.jwt_secret.as_ref())
            .map_err(|_| error::SystemError::unauthorized("Refresh token invalid or expired"))?;

        if claims._type.as_ref() != Some(&TypeClaims::RefreshToken) {
            return Err(error::SystemError::unauthorized("Refresh token invalid or expired"));
        }

        let jti = claims
            .jti
            .ok_or_else(|| error::SystemError::unauthorized("Refresh token invalid or expired"))?;

        let refresh_key = format!("refresh_token:{jti}");
        let known: Option<String> = self.cache.get(&refresh_key).await?;
        if known.as_deref() != Some(claims.sub.as_str()) {
            return Err(error::SystemError::unauthorized("Refresh token invalid or expired"));
        }

        // Rotate: the presented token is single-use.
        self.cache.delete(&refresh_key).await?;
        self.issue_tokens(&claims.sub).await
    }

    pub async fn sign_out(&self, refresh_token: Option<String>) -> Result<(), error::SystemError> {
        let Some(token) = refresh_token else {
            return Ok(());
        };

        if let Ok(claims) = Claims::decode(&token, ENV.jwt_secret.as_ref()) {
            if let Some(jti) = claims.jti {
                self.cache.delete(&format!("refresh_token:{jti}")).await?;
            }
        }

        Ok(())
    }

    async fn issue_tokens(&self, email: &str) -> Result<(String, String), error::SystemError> {
        let access_token = Claims::new(email, ENV.access_token_expiration)
            .with_type(TypeClaims::AccessToken)
            .encode(ENV.jwt_secret.as_ref())?;

        let jti = Uuid::now_v7();
        let refresh_token = Claims::new(email, ENV.refresh_token_expiration)
            .with_jti(jti)
            .with_type(TypeClaims::RefreshToken)
            .encode(ENV.jwt_secret.as_ref())?;

        let refresh_key = format!("refresh_token:{jti}");
        self.cache
            .set(&refresh_key, &email.to_string(), ENV.refresh_token_expiration as usize)
            .await?;

        Ok((access_token, refresh_token))
    }
}
