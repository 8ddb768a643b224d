//! Product Service - Business logic layer

use futures_util::future::join_all;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::image_store::ImageStore;
use crate::models::{CreateProduct, ImageUpload, Product, ProductFilter, UpdateProduct};
use crate::repository::ProductRepository;

/// Product catalog. Image uploads go through an [`ImageStore`] and never
/// block product creation.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    images: Arc<dyn ImageStore>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R, images: Arc<dyn ImageStore>) -> Self {
        Self {
            repository: Arc::new(repository),
            images,
        }
    }

    /// Create a product owned by `farmer_id`, uploading `uploads` first.
    ///
    /// Uploads that fail are logged and left out of `images`.
    #[instrument(skip(self, input, uploads), fields(product_name = %input.name, uploads = uploads.len()))]
    pub async fn create_product(
        &self,
        farmer_id: Uuid,
        input: CreateProduct,
        uploads: Vec<ImageUpload>,
    ) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let results = join_all(uploads.into_iter().map(|upload| {
            let filename = upload.filename.clone();
            async move { (filename, self.images.upload(upload).await) }
        }))
        .await;

        let images = results
            .into_iter()
            .filter_map(|(filename, result)| match result {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(%filename, error = %e, "Image upload failed, skipping");
                    None
                }
            })
            .collect();

        self.repository
            .create(Product::new(farmer_id, input, images))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Products for whichever of `ids` still exist
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn get_many(&self, ids: &[Uuid]) -> ProductResult<Vec<Product>> {
        self.repository.get_many(ids).await
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        self.repository.list(filter).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        self.repository
            .update(id, input)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> ProductResult<()> {
        if !self.repository.delete(id).await? {
            return Err(ProductError::NotFound(id));
        }
        tracing::info!(product_id = %id, "Product deleted successfully");
        Ok(())
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            images: Arc::clone(&self.images),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_store::{DisabledImageStore, MockImageStore};
    use crate::repository::{InMemoryProductRepository, MockProductRepository};

    fn cassava() -> CreateProduct {
        CreateProduct {
            name: "Cassava".to_string(),
            description: "Freshly harvested".to_string(),
            price: 800,
            quantity: 25,
            location: None,
        }
    }

    fn upload(name: &str) -> ImageUpload {
        ImageUpload {
            filename: name.to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn test_failed_uploads_are_skipped() {
        let mut images = MockImageStore::new();
        images.expect_upload().times(2).returning(|image| {
            if image.filename == "broken.png" {
                Err(ProductError::ImageUpload("timeout".to_string()))
            } else {
                Ok(format!("https://cdn.agronet.test/{}", image.filename))
            }
        });

        let service = ProductService::new(InMemoryProductRepository::new(), Arc::new(images));
        let product = service
            .create_product(
                Uuid::now_v7(),
                cassava(),
                vec![upload("broken.png"), upload("good.png")],
            )
            .await
            .unwrap();

        assert_eq!(product.images, vec!["https://cdn.agronet.test/good.png"]);
    }

    #[tokio::test]
    async fn test_disabled_store_still_creates_product() {
        let service = ProductService::new(
            InMemoryProductRepository::new(),
            Arc::new(DisabledImageStore),
        );
        let product = service
            .create_product(Uuid::now_v7(), cassava(), vec![upload("a.png")])
            .await
            .unwrap();

        assert!(product.images.is_empty());
        assert_eq!(service.get_product(product.id).await.unwrap(), product);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_repository() {
        let mut repo = MockProductRepository::new();
        repo.expect_create().never();

        let service = ProductService::new(repo, Arc::new(DisabledImageStore));
        let result = service
            .create_product(
                Uuid::now_v7(),
                CreateProduct {
                    name: String::new(),
                    ..cassava()
                },
                vec![],
            )
            .await;

        assert!(matches!(result, Err(ProductError::Validation(_))));
    }

    #[tokio::test]
    async fn test_missing_product() {
        let service = ProductService::new(
            InMemoryProductRepository::new(),
            Arc::new(DisabledImageStore),
        );
        let id = Uuid::now_v7();

        let err = service.get_product(id).await.unwrap_err();
        assert_eq!(err.to_string(), format!("Product with the id {id} not found"));
        assert!(matches!(
            service.update_product(id, UpdateProduct::default()).await,
            Err(ProductError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_product(id).await,
            Err(ProductError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_get_many_skips_deleted() {
        let service = ProductService::new(
            InMemoryProductRepository::new(),
            Arc::new(DisabledImageStore),
        );
        let farmer = Uuid::now_v7();
        let kept = service
            .create_product(farmer, cassava(), vec![])
            .await
            .unwrap();
        let gone = service
            .create_product(farmer, cassava(), vec![])
            .await
            .unwrap();
        service.delete_product(gone.id).await.unwrap();

        let found = service.get_many(&[kept.id, gone.id]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, kept.id);
    }
}
