//! Wishlist Service - Business logic layer

use domain_products::{ProductRepository, ProductService};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{WishlistError, WishlistResult};
use crate::models::{WishlistEntry, WishlistItem};
use crate::repository::WishlistRepository;

pub struct WishlistService<W: WishlistRepository, P: ProductRepository> {
    repository: Arc<W>,
    products: ProductService<P>,
}

impl<W: WishlistRepository, P: ProductRepository> WishlistService<W, P> {
    pub fn new(repository: W, products: ProductService<P>) -> Self {
        Self {
            repository: Arc::new(repository),
            products,
        }
    }

    /// Save `product_id` for `user_id`. Duplicates are rejected by the
    /// store's unique index.
    #[instrument(skip(self))]
    pub async fn add(&self, user_id: Uuid, product_id: Uuid) -> WishlistResult<WishlistEntry> {
        self.products.get_product(product_id).await?;
        let entry = self
            .repository
            .add(WishlistEntry::new(user_id, product_id))
            .await?;
        tracing::info!(%user_id, %product_id, "Product added to wishlist");
        Ok(entry)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: Uuid, product_id: Uuid) -> WishlistResult<()> {
        if !self.repository.remove(user_id, product_id).await? {
            return Err(WishlistError::NotInWishlist);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn contains(&self, user_id: Uuid, product_id: Uuid) -> WishlistResult<bool> {
        self.repository.contains(user_id, product_id).await
    }

    /// Entries newest first, each with its product if it still exists
    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: Uuid) -> WishlistResult<Vec<WishlistItem>> {
        let entries = self.repository.list_for_user(user_id).await?;
        let ids: Vec<Uuid> = entries.iter().map(|e| e.product_id).collect();

        let mut products: HashMap<Uuid, _> = self
            .products
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(entries
            .into_iter()
            .map(|entry| WishlistItem {
                id: entry.id,
                product_id: entry.product_id,
                created_at: entry.created_at,
                product: products.remove(&entry.product_id),
            })
            .collect())
    }
}

impl<W: WishlistRepository, P: ProductRepository> Clone for WishlistService<W, P> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            products: self.products.clone(),
        }
    }
}
