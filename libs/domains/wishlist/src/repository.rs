use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{WishlistError, WishlistResult};
use crate::models::WishlistEntry;

/// Repository trait for wishlist entries
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WishlistRepository: Send + Sync {
    /// Fails with [`WishlistError::AlreadyInWishlist`] when the pair exists
    async fn add(&self, entry: WishlistEntry) -> WishlistResult<WishlistEntry>;

    /// Returns `false` if the pair was not present
    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> WishlistResult<bool>;

    async fn contains(&self, user_id: Uuid, product_id: Uuid) -> WishlistResult<bool>;

    /// Newest first
    async fn list_for_user(&self, user_id: Uuid) -> WishlistResult<Vec<WishlistEntry>>;
}

/// In-memory implementation of WishlistRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryWishlistRepository {
    entries: Arc<RwLock<Vec<WishlistEntry>>>,
}

impl InMemoryWishlistRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WishlistRepository for InMemoryWishlistRepository {
    async fn add(&self, entry: WishlistEntry) -> WishlistResult<WishlistEntry> {
        let mut entries = self.entries.write().await;
        if entries
            .iter()
            .any(|e| e.user_id == entry.user_id && e.product_id == entry.product_id)
        {
            return Err(WishlistError::AlreadyInWishlist);
        }
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> WishlistResult<bool> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| !(e.user_id == user_id && e.product_id == product_id));
        Ok(entries.len() < before)
    }

    async fn contains(&self, user_id: Uuid, product_id: Uuid) -> WishlistResult<bool> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .any(|e| e.user_id == user_id && e.product_id == product_id))
    }

    async fn list_for_user(&self, user_id: Uuid) -> WishlistResult<Vec<WishlistEntry>> {
        let entries = self.entries.read().await;
        let mut mine: Vec<WishlistEntry> = entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(mine)
    }
}
