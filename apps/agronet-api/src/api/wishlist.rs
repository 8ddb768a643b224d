//! Wishlist routes; saved products are resolved through the shared product
//! service.

use axum::Router;
use domain_wishlist::{MongoWishlistRepository, WishlistService, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = MongoWishlistRepository::new(&state.db);
    handlers::router(WishlistService::new(repository, state.products.clone()))
}
