//! Wishlist Domain
//!
//! Users save products they are interested in. Each (user, product) pair is
//! stored once, enforced by a unique compound index, and listings resolve
//! the saved products through the products domain.

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{WishlistError, WishlistResult};
pub use handlers::ApiDoc;
pub use models::{AddToWishlist, WishlistCheck, WishlistEntry, WishlistItem, WishlistRemoved};
pub use mongodb::MongoWishlistRepository;
pub use repository::{InMemoryWishlistRepository, WishlistRepository};
pub use service::WishlistService;
