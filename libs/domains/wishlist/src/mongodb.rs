//! MongoDB implementation of WishlistRepository

use async_trait::async_trait;
use database::mongodb::{is_duplicate_key, uuid_bson};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::{FindOptions, IndexOptions},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{WishlistError, WishlistResult};
use crate::models::WishlistEntry;
use crate::repository::WishlistRepository;

#[derive(Clone)]
pub struct MongoWishlistRepository {
    collection: Collection<WishlistEntry>,
}

impl MongoWishlistRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<WishlistEntry>("wishlists"),
        }
    }

    pub async fn init_indexes(&self) -> WishlistResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "user_id": 1, "product_id": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_user_product_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "user_id": 1, "_id": -1 })
                .options(IndexOptions::builder().name("idx_user_recent".to_string()).build())
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Wishlist indexes created successfully");
        Ok(())
    }

    fn pair(user_id: Uuid, product_id: Uuid) -> Document {
        doc! { "user_id": uuid_bson(user_id), "product_id": uuid_bson(product_id) }
    }
}

#[async_trait]
impl WishlistRepository for MongoWishlistRepository {
    #[instrument(skip(self, entry), fields(user_id = %entry.user_id, product_id = %entry.product_id))]
    async fn add(&self, entry: WishlistEntry) -> WishlistResult<WishlistEntry> {
        match self.collection.insert_one(&entry).await {
            Ok(_) => Ok(entry),
            Err(e) if is_duplicate_key(&e) => Err(WishlistError::AlreadyInWishlist),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> WishlistResult<bool> {
        let result = self
            .collection
            .delete_one(Self::pair(user_id, product_id))
            .await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn contains(&self, user_id: Uuid, product_id: Uuid) -> WishlistResult<bool> {
        let count = self
            .collection
            .count_documents(Self::pair(user_id, product_id))
            .limit(1)
            .await?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: Uuid) -> WishlistResult<Vec<WishlistEntry>> {
        let options = FindOptions::builder().sort(doc! { "_id": -1 }).build();
        let cursor = self
            .collection
            .find(doc! { "user_id": uuid_bson(user_id) })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }
}
