//! Shared application state.
//!
//! Services used by more than one router live here so every router talks to
//! the same instances.

use axum_helpers::JwtAuth;
use domain_products::{
    DisabledImageStore, HttpImageStore, ImageStore, MongoProductRepository, ProductService,
};
use domain_users::{MongoUserRepository, UserService};
use mongodb::{Client, Database};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{Config, ImageStoreConfig};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Cloneable; shares the underlying connection pool
    pub mongo_client: Client,
    pub db: Database,
    pub jwt: JwtAuth,
    pub users: UserService<MongoUserRepository>,
    pub products: ProductService<MongoProductRepository>,
}

impl AppState {
    pub fn new(config: Config, mongo_client: Client) -> Self {
        let db = mongo_client.database(config.mongodb.database());
        let jwt = JwtAuth::new(&config.jwt);
        let users = UserService::new(MongoUserRepository::new(&db));
        let products = ProductService::new(
            MongoProductRepository::new(&db),
            image_store(&config.images),
        );

        Self {
            config,
            mongo_client,
            db,
            jwt,
            users,
            products,
        }
    }
}

fn image_store(config: &ImageStoreConfig) -> Arc<dyn ImageStore> {
    match &config.upload_url {
        Some(url) => {
            info!(upload_url = %url, "Product image uploads enabled");
            Arc::new(HttpImageStore::new(url.clone(), config.token.clone()))
        }
        None => {
            warn!("IMAGE_UPLOAD_URL is not set; product images will be dropped");
            Arc::new(DisabledImageStore)
        }
    }
}
