use crate::api::error::AppError;
use crate::config::AppConfig;
use crate::entities::{prelude::*, sessions, users};
use crate::models::CurrentUser;
use crate::utils::auth::{create_jwt, validate_jwt};
use argon2::{
    Argon2,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
};
use rand::rngs::OsRng;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

pub struct AuthService {
    db: DatabaseConnection,
    config: AppConfig,
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(e.to_string()))
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = argon2::PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

impl AuthService {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self { db, config }
    }

    async fn find_user(&self, username: &str) -> Result<Option<users::Model>, AppError> {
        Ok(Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    /// Checks credentials. An unknown username that matches a configured
    /// bootstrap credential is provisioned on the spot; once the record exists
    /// only its stored hash is consulted.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<users::Model>, AppError> {
        if let Some(user) = self.find_user(username).await? {
            return Ok(verify_password(password, &user.password_hash)?.then_some(user));
        }

        if self.config.find_bootstrap(username, password).is_none() {
            return Ok(None);
        }

        let user = users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(hash_password(password)?),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        match user.insert(&self.db).await {
            Ok(user) => {
                tracing::info!("👤 Provisioned bootstrap user {} (id={})", user.username, user.id);
                Ok(Some(user))
            }
            Err(e) => {
                // Lost a race against a concurrent first login
                match self.find_user(username).await? {
                    Some(user) if verify_password(password, &user.password_hash)? => Ok(Some(user)),
                    Some(_) => Ok(None),
                    None => Err(e.into()),
                }
            }
        }
    }

    /// Issues a session token and records it server-side.
    pub async fn start_session(&self, user: &users::Model) -> Result<String, AppError> {
        let issued = create_jwt(
            user.id,
            &user.username,
            &self.config.jwt_secret,
            self.config.session_ttl_hours,
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

        // Expired rows are never honoured again
        let pruned = Sessions::delete_many()
            .filter(sessions::Column::ExpiresAt.lte(Utc::now()))
            .exec(&self.db)
            .await?;
        if pruned.rows_affected > 0 {
            tracing::debug!("Pruned {} expired sessions", pruned.rows_affected);
        }

        sessions::ActiveModel {
            id: Set(issued.jti),
            user_id: Set(user.id),
            expires_at: Set(issued.expires_at),
        }
        .insert(&self.db)
        .await?;

        tracing::info!("🔑 Session started for {} (id={})", user.username, user.id);
        Ok(issued.token)
    }

    /// Maps a session token to its user, `None` when the token is invalid,
    /// revoked, expired or its user is gone.
    pub async fn resolve_session(&self, token: &str) -> Result<Option<CurrentUser>, AppError> {
        let Ok(claims) = validate_jwt(token, &self.config.jwt_secret) else {
            return Ok(None);
        };
        let Some(user_id) = claims.user_id() else {
            return Ok(None);
        };

        let session = Sessions::find_by_id(claims.jti)
            .filter(sessions::Column::UserId.eq(user_id))
            .filter(sessions::Column::ExpiresAt.gt(Utc::now()))
            .one(&self.db)
            .await?;
        if session.is_none() {
            return Ok(None);
        }

        let user = Users::find_by_id(user_id).one(&self.db).await?;

        Ok(user.map(|u| CurrentUser {
            id: u.id,
            username: u.username,
        }))
    }

    /// Revokes the session behind `token`. Invalid tokens are ignored.
    pub async fn end_session(&self, token: &str) -> Result<(), AppError> {
        if let Ok(claims) = validate_jwt(token, &self.config.jwt_secret) {
            let res = Sessions::delete_by_id(claims.jti).exec(&self.db).await?;
            tracing::info!("👋 Session closed for {} ({} row)", claims.username, res.rows_affected);
        }
        Ok(())
    }
}
