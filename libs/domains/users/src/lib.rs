//! Users Domain
//!
//! Identity store for the marketplace plus the authentication boundary
//! built on it.
//!
//! # Features
//!
//! - Case-insensitive unique email, enforced by the store
//! - Role and farmer-application status, written back by other domains
//! - Registration and login with Argon2 hashes and HS256 tokens
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (/auth, /users)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Services   │  ← AuthService → UserService
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← trait + MongoDB / in-memory implementations
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, enums
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_users::{AuthService, InMemoryUserRepository, UserService, handlers};
//!
//! let users = UserService::new(InMemoryUserRepository::new());
//! let jwt = JwtAuth::new(&JwtConfig::new("a-development-secret-of-32-chars!!"));
//!
//! let auth_routes = handlers::auth_router(AuthService::new(users.clone(), jwt));
//! let user_routes = handlers::router(users);
//! ```

pub mod auth;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use auth::AuthService;
pub use error::{UserError, UserResult};
pub use handlers::{ApiDoc, AuthApiDoc};
pub use models::{
    AccountStatus, AuthResponse, FarmerApplicationStatus, GeoPoint, LoginRequest, NewUser,
    RegisterRequest, Role, User, UserFilter, UserPatch, UserResponse, UserSummary,
};
pub use mongodb::MongoUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
