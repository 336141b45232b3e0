//! Registration, login and password updates. Tokens are issued here so the
//! handlers only ever see opaque strings.

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::auth::jwt::JwtProvider;
use crate::auth::password;
use crate::domain::error::{Result, ServiceError};
use crate::domain::models::User;
use crate::domain::ports::{UserConflict, UserRepo};

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub birth_date: NaiveDate,
}

pub struct UserService {
    users: Arc<dyn UserRepo>,
    tokens: JwtProvider,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepo>, tokens: JwtProvider) -> Self {
        Self { users, tokens }
    }

    /// Creates an account and signs the caller in. A taken email or phone is
    /// a conflict; the store does the check so concurrent registrations
    /// cannot both pass it.
    pub async fn register(&self, input: RegisterInput) -> Result<String> {
        let password_hash = password::hash(&input.password)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let user = self
            .users
            .save(User {
                id: 0,
                first_name: input.first_name,
                last_name: input.last_name,
                email: input.email,
                password_hash,
                phone: input.phone,
                birth_date: input.birth_date,
                created_at: Local::now().naive_local(),
            })
            .await?
            .map_err(|conflict| {
                ServiceError::Conflict(match conflict {
                    UserConflict::Email => "El email solicitado ya existe!".into(),
                    UserConflict::Phone => "El teléfono solicitado ya existe!".into(),
                })
            })?;

        self.issue_token(&user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("El usuario no existe".into()))?;

        if !password::verify(password, &user.password_hash) {
            return Err(ServiceError::BadRequest(
                "La contraseña es incorrecta".into(),
            ));
        }

        self.issue_token(&user)
    }

    /// Password reset by email, as exposed on the open auth surface.
    pub async fn update_password(&self, email: &str, new_password: &str) -> Result<()> {
        let mut user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("El usuario no existe".into()))?;

        user.password_hash = password::hash(new_password)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.users.update(user).await?;
        Ok(())
    }

    fn issue_token(&self, user: &User) -> Result<String> {
        self.tokens
            .generate(&user.email, user.id)
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }
}
