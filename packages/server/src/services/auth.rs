use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entity::user;
use crate::utils::jwt;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("auth backend unavailable: {0}")]
    Transport(String),
}

/// Verifies that a token was issued to a username.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn verify(&self, username: &str, token: &str) -> Result<(), AuthError>;
}

/// Checks signed auth tokens and that the account still exists.
pub struct JwtAuthGateway {
    db: DatabaseConnection,
    secret: String,
}

impl JwtAuthGateway {
    pub fn new(db: DatabaseConnection, secret: impl Into<String>) -> Self {
        Self {
            db,
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl AuthGateway for JwtAuthGateway {
    async fn verify(&self, username: &str, token: &str) -> Result<(), AuthError> {
        let claims = jwt::verify(token, &self.secret).map_err(|e| {
            tracing::debug!(username, "Token rejected: {e}");
            AuthError::InvalidCredentials
        })?;

        if claims.sub != username {
            return Err(AuthError::InvalidCredentials);
        }

        let account = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        match account {
            Some(u) if u.id == claims.uid => Ok(()),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}
