use super::jwt::JwtClaims;
use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Role name carried in tokens issued to administrators.
pub const ADMIN_ROLE: &str = "admin";

/// The authenticated caller, taken from claims that
/// [`jwt_auth_middleware`](super::jwt_auth_middleware) verified.
///
/// Handlers pass this to services explicitly; nothing downstream reads
/// request-scoped state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

impl CurrentUser {
    pub fn from_claims(claims: &JwtClaims) -> Result<Self, AppError> {
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(Self {
            id,
            email: claims.email.clone(),
            role: claims.role.clone(),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }

    /// `Forbidden` unless the caller holds one of `roles`.
    pub fn require_any_role(&self, roles: &[&str]) -> Result<(), AppError> {
        if roles.iter().any(|role| *role == self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "This action requires one of the roles: {}",
                roles.join(", ")
            )))
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        self.require_any_role(&[ADMIN_ROLE])
    }

    /// `Forbidden` unless the caller is `owner` or an admin.
    pub fn require_self_or_admin(&self, owner: Uuid) -> Result<(), AppError> {
        if self.id == owner || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You can only access your own resources".to_string(),
            ))
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<JwtClaims>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        Self::from_claims(claims)
    }
}
