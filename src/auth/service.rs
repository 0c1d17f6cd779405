use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::models::{Session, User};
use crate::db::services::{SessionService, UserService};
use crate::error::{AppError, AuthError, OptionalExt, ValidationError};
use crate::Result;

/// Signup form as submitted.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub uname: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

pub struct AuthService {
    users: Arc<dyn UserService>,
    sessions: Arc<dyn SessionService>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserService>, sessions: Arc<dyn SessionService>, bcrypt_cost: u32) -> Self {
        Self {
            users,
            sessions,
            bcrypt_cost,
        }
    }

    pub async fn signup(&self, req: &SignupRequest) -> Result<User> {
        if [&req.uname, &req.email, &req.password, &req.password2]
            .iter()
            .any(|field| field.is_empty())
        {
            return Err(ValidationError::EmptyFields.into());
        }
        if self.users.user_from_email(&req.email).await.optional()?.is_some() {
            return Err(ValidationError::EmailTaken.into());
        }
        if req.password != req.password2 {
            return Err(ValidationError::PasswordMismatch.into());
        }

        let hash = hash_password(&req.password, self.bcrypt_cost).await?;
        let user = User::new(req.uname.clone(), req.email.clone(), hash);
        self.users.create_user(&user).await?;

        info!("Created user {}", user.id);
        Ok(user)
    }

    /// Opens a new session. Unknown email and wrong password fail the same way.
    pub async fn login(&self, email: &str, password: &str, now: DateTime<Utc>) -> Result<Session> {
        let Some(user) = self.users.user_from_email(email).await.optional()? else {
            warn!("Login failed: no account for the given email");
            return Err(AuthError::InvalidCredentials.into());
        };
        if !verify_password(password, &user.password).await? {
            warn!("Login failed: wrong password for user {}", user.id);
            return Err(AuthError::InvalidCredentials.into());
        }

        let session = Session::new(user.id.clone(), now);
        self.sessions.create_session(&session).await?;

        info!("User {} logged in", user.id);
        Ok(session)
    }

    pub async fn logout(&self, session: &Session) -> Result<()> {
        self.sessions.delete_session(&session.id).await?;
        info!("User {} logged out", session.user_id);
        Ok(())
    }

    /// The current password is checked before the new entries are compared.
    pub async fn change_password(
        &self,
        user_id: &str,
        current: &str,
        new_password: &str,
        repeated: &str,
    ) -> Result<()> {
        let mut user = self.users.user(user_id).await?;
        if !verify_password(current, &user.password).await? {
            return Err(AuthError::WrongPassword.into());
        }
        if new_password != repeated {
            return Err(ValidationError::NewPasswordMismatch.into());
        }

        user.password = hash_password(new_password, self.bcrypt_cost).await?;
        self.users.update_user(&user).await?;

        info!("User {} changed password", user.id);
        Ok(())
    }

    pub async fn change_email(&self, user_id: &str, current: &str, new_email: &str) -> Result<User> {
        let mut user = self.users.user(user_id).await?;
        if !verify_password(current, &user.password).await? {
            return Err(AuthError::WrongPassword.into());
        }
        if let Some(owner) = self.users.user_from_email(new_email).await.optional()? {
            if owner.id != user.id {
                return Err(ValidationError::NewEmailTaken.into());
            }
        }

        user.email = new_email.to_string();
        self.users.update_user(&user).await?;

        info!("User {} changed email", user.id);
        Ok(user)
    }
}

pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(hash)
}

/// A stored hash bcrypt cannot read counts as a mismatch.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    match verified {
        Ok(matches) => Ok(matches),
        Err(e) => {
            warn!("Stored password hash is unreadable: {}", e);
            Ok(false)
        }
    }
}
