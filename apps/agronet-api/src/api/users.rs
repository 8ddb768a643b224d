//! Authentication and user routes

use axum::Router;
use domain_users::{AuthService, handlers};

use crate::state::AppState;

pub fn auth_router(state: &AppState) -> Router {
    handlers::auth_router(AuthService::new(state.users.clone(), state.jwt.clone()))
}

pub fn router(state: &AppState) -> Router {
    handlers::router(state.users.clone())
}
