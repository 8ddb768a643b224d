//! Registration, login and profile on top of the identity store.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::JwtAuth;
use std::sync::LazyLock;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{AuthResponse, NewUser, RegisterRequest, Role, User, UserResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Verified against when the email is unknown so both login failures cost
/// one Argon2 run.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("no-such-account#Pa55").ok());

pub fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// 8 to 128 characters with upper, lower, digit and symbol.
pub fn validate_password(password: &str) -> UserResult<()> {
    let len = password.chars().count();
    if len < 8 {
        return Err(UserError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if len > 128 {
        return Err(UserError::Validation(
            "Password cannot exceed 128 characters".to_string(),
        ));
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(UserError::Validation(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(UserError::Validation(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(UserError::Validation(
            "Password must contain at least one digit".to_string(),
        ));
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err(UserError::Validation(format!(
            "Password must contain at least one special character ({SPECIAL_CHARS})"
        )));
    }
    Ok(())
}

pub struct AuthService<R: UserRepository> {
    users: UserService<R>,
    jwt: JwtAuth,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(users: UserService<R>, jwt: JwtAuth) -> Self {
        Self { users, jwt }
    }

    /// Administrators are never self-registered; `role` may only be
    /// `buyer` or `farmer`.
    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterRequest) -> UserResult<AuthResponse> {
        validate_password(&input.password)?;

        let role = input.role.unwrap_or_default();
        if role == Role::Admin {
            return Err(UserError::Validation(
                "Role must be either buyer or farmer".to_string(),
            ));
        }

        let user = self
            .users
            .create_user(NewUser {
                firstname: input.firstname,
                lastname: input.lastname,
                email: input.email,
                password_hash: hash_password(&input.password)?,
                role,
                location: input.location,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        self.issue(user, "Registration successful")
    }

    /// Every failure, including a missing account, reads as invalid
    /// credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> UserResult<AuthResponse> {
        let Some(user) = self.users.find_by_email(email).await? else {
            if let Some(hash) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, hash);
            }
            return Err(UserError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash).unwrap_or(false) {
            tracing::info!(user_id = %user.id, "Rejected login");
            return Err(UserError::InvalidCredentials);
        }

        self.issue(user, "Login successful")
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, caller: Uuid) -> UserResult<UserResponse> {
        self.users.get_user(caller).await.map(UserResponse::from)
    }

    fn issue(&self, user: User, message: &str) -> UserResult<AuthResponse> {
        let token = self
            .jwt
            .create_token(&user.id.to_string(), &user.email, &user.role.to_string())
            .map_err(|e| UserError::Token(e.to_string()))?;

        Ok(AuthResponse {
            user: user.into(),
            token,
            message: message.to_string(),
        })
    }
}

impl<R: UserRepository> Clone for AuthService<R> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            jwt: self.jwt.clone(),
        }
    }
}
