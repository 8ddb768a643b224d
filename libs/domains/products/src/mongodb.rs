//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use chrono::Utc;
use database::mongodb::{timestamp_bson, uuid_bson, uuids_bson};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, to_bson},
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::{Product, ProductFilter, UpdateProduct};
use crate::repository::ProductRepository;

/// MongoDB implementation of the ProductRepository
#[derive(Clone)]
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Product>("products"),
        }
    }

    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "farmer_id": 1, "_id": -1 })
                .options(IndexOptions::builder().name("idx_farmer".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "price": 1 })
                .options(IndexOptions::builder().name("idx_price".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "location": "2dsphere" })
                .options(
                    IndexOptions::builder()
                        .name("idx_location_2dsphere".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    fn build_filter(filter: &ProductFilter) -> Document {
        let mut doc = doc! {};

        if let Some(farmer_id) = filter.farmer_id {
            doc.insert("farmer_id", uuid_bson(farmer_id));
        }

        if filter.min_price.is_some() || filter.max_price.is_some() {
            let mut price = doc! {};
            if let Some(min) = filter.min_price {
                price.insert("$gte", min);
            }
            if let Some(max) = filter.max_price {
                price.insert("$lte", max);
            }
            doc.insert("price", price);
        }

        if filter.in_stock == Some(true) {
            doc.insert("quantity", doc! { "$gt": 0 });
        }

        if let Some(ref search) = filter.search {
            let pattern = format!("(?i){}", regex::escape(search));
            doc.insert(
                "$or",
                vec![
                    doc! { "name": { "$regex": pattern.clone() } },
                    doc! { "description": { "$regex": pattern } },
                ],
            );
        }

        doc
    }

    fn build_update(input: UpdateProduct) -> Document {
        let mut set = doc! { "updated_at": timestamp_bson(Utc::now()) };

        if let Some(name) = input.name {
            set.insert("name", name);
        }
        if let Some(description) = input.description {
            set.insert("description", description);
        }
        if let Some(price) = input.price {
            set.insert("price", price);
        }
        if let Some(quantity) = input.quantity {
            set.insert("quantity", quantity);
        }
        if let Some(images) = input.images {
            set.insert("images", images);
        }
        if let Some(location) = input.location {
            set.insert("location", to_bson(&location).unwrap_or(Bson::Null));
        }

        doc! { "$set": set }
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, product), fields(product_id = %product.id, farmer_id = %product.farmer_id))]
    async fn create(&self, product: Product) -> ProductResult<Product> {
        self.collection.insert_one(&product).await?;
        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        Ok(self.collection.find_one(doc! { "_id": uuid_bson(id) }).await?)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn get_many(&self, ids: &[Uuid]) -> ProductResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": uuids_bson(ids) } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        let options = FindOptions::builder()
            .limit(filter.limit)
            .skip(filter.offset)
            .sort(doc! { "_id": -1 })
            .build();

        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Option<Product>> {
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": uuid_bson(id) }, Self::build_update(input))
            .return_document(ReturnDocument::After)
            .await?;

        if updated.is_some() {
            tracing::info!(product_id = %id, "Product updated successfully");
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": uuid_bson(id) })
            .await?;
        Ok(result.deleted_count > 0)
    }
}
