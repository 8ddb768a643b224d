use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_products::ProductError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum WishlistError {
    #[error("Product already in wishlist")]
    AlreadyInWishlist,

    #[error("Product not found in wishlist")]
    NotInWishlist,

    #[error("Product with the id {0} not found")]
    ProductNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(String),
}

pub type WishlistResult<T> = Result<T, WishlistError>;

impl From<WishlistError> for AppError {
    fn from(err: WishlistError) -> Self {
        match err {
            WishlistError::AlreadyInWishlist => AppError::Conflict(err.to_string()),
            WishlistError::NotInWishlist | WishlistError::ProductNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            WishlistError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for WishlistError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for WishlistError {
    fn from(err: mongodb::error::Error) -> Self {
        WishlistError::Database(err.to_string())
    }
}

impl From<ProductError> for WishlistError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => WishlistError::ProductNotFound(id),
            other => WishlistError::Database(other.to_string()),
        }
    }
}
