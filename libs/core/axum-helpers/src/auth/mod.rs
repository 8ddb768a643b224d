//! Token-based authentication.
//!
//! - [`JwtAuth`] issues and verifies HS256 tokens carrying `{sub, email, role}`
//! - [`jwt_auth_middleware`] decodes a presented token into request extensions
//! - [`CurrentUser`] hands the verified caller to handlers
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, jwt_auth_middleware};
//! use core_config::FromEnv;
//!
//! let jwt_auth = JwtAuth::new(&JwtConfig::from_env()?);
//! let api = routes.layer(axum::middleware::from_fn_with_state(jwt_auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod current_user;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use current_user::{ADMIN_ROLE, CurrentUser};
pub use jwt::{JwtAuth, JwtClaims, TOKEN_TTL_SECS, TokenError};
pub use middleware::jwt_auth_middleware;
