//! API routes
//!
//! Every router here is nested under `/api` by `axum_helpers::create_router`.

pub mod farmer_applications;
pub mod health;
pub mod messages;
pub mod products;
pub mod users;
pub mod wishlist;

use axum::{Router, middleware::from_fn_with_state};
use axum_helpers::jwt_auth_middleware;
use mongodb::Database;

use crate::state::AppState;

pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/auth", users::auth_router(state))
        .nest("/users", users::router(state))
        .nest("/farmer-applications", farmer_applications::router(state))
        .nest("/messages", messages::router(state))
        .nest("/products", products::router(state))
        .nest("/wishlist", wishlist::router(state))
        .layer(from_fn_with_state(state.jwt.clone(), jwt_auth_middleware))
        .merge(health::router(state.clone()))
}

/// Creates every collection's indexes; safe to run on each start-up.
pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    domain_users::MongoUserRepository::new(db)
        .init_indexes()
        .await?;
    domain_farmer_applications::MongoApplicationRepository::new(db)
        .init_indexes()
        .await?;
    domain_messages::MongoMessageRepository::new(db)
        .init_indexes()
        .await?;
    domain_products::MongoProductRepository::new(db)
        .init_indexes()
        .await?;
    domain_wishlist::MongoWishlistRepository::new(db)
        .init_indexes()
        .await?;
    Ok(())
}
