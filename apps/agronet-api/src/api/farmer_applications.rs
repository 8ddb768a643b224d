//! Farmer application routes. Approval decisions are written back to the
//! shared user service.

use axum::Router;
use domain_farmer_applications::{ApplicationService, MongoApplicationRepository, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = MongoApplicationRepository::new(&state.db);
    handlers::router(ApplicationService::new(repository, state.users.clone()))
}
