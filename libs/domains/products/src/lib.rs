//! Products Domain
//!
//! Farmer-owned product listings stored in MongoDB. Product images are pushed
//! to an external [`ImageStore`] on creation; a failed upload never blocks the
//! product itself.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_products::{handlers, HttpImageStore, MongoProductRepository, ProductService};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("agronet");
//!
//! let repository = MongoProductRepository::new(&db);
//! repository.init_indexes().await?;
//! let images = Arc::new(HttpImageStore::new("https://uploads.example.com", None));
//! let service = ProductService::new(repository, images);
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod image_store;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use image_store::{DisabledImageStore, HttpImageStore, ImageStore};
pub use models::{CreateProduct, ImageUpload, Product, ProductFilter, UpdateProduct};
pub use mongodb::MongoProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
