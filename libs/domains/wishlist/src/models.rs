use chrono::{DateTime, Utc};
use domain_products::Product;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A product saved by a user, stored in `wishlists`. The (user, product) pair
/// is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WishlistEntry {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl WishlistEntry {
    pub fn new(user_id: Uuid, product_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            product_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddToWishlist {
    pub product_id: Uuid,
}

/// Entry with its product resolved; `product` is null once the product has
/// been deleted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WishlistItem {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub product_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub product: Option<Product>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WishlistCheck {
    pub in_wishlist: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WishlistRemoved {
    pub message: String,
}
