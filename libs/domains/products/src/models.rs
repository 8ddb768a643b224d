use chrono::{DateTime, Utc};
use domain_users::GeoPoint;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Product listed by a farmer, stored in `products`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price in minor currency units
    pub price: i64,
    pub quantity: i32,
    /// Public image URLs
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub location: GeoPoint,
    #[serde(default)]
    pub ratings_average: f64,
    #[serde(default)]
    pub ratings_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a new product; images arrive separately as uploads
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    /// Price in minor currency units
    #[validate(range(min = 0))]
    pub price: i64,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub quantity: i32,
    pub location: Option<GeoPoint>,
}

/// Partial update of a product
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub price: Option<i64>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    pub images: Option<Vec<String>>,
    pub location: Option<GeoPoint>,
}

/// Query filters for listing products
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ProductFilter {
    pub farmer_id: Option<Uuid>,
    /// Minimum price (minor units)
    pub min_price: Option<i64>,
    /// Maximum price (minor units)
    pub max_price: Option<i64>,
    /// Only products with quantity left
    pub in_stock: Option<bool>,
    /// Case-insensitive match on name or description
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: u64,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            farmer_id: None,
            min_price: None,
            max_price: None,
            in_stock: None,
            search: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_limit() -> i64 {
    50
}

/// One uploaded image file
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Product {
    pub fn new(farmer_id: Uuid, input: CreateProduct, images: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            farmer_id,
            name: input.name,
            description: input.description,
            price: input.price,
            quantity: input.quantity,
            images,
            location: input.location.unwrap_or_default(),
            ratings_average: 0.0,
            ratings_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(images) = update.images {
            self.images = images;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        self.updated_at = Utc::now();
    }

    pub fn matches(&self, filter: &ProductFilter) -> bool {
        let search = filter.search.as_deref().map(str::to_lowercase);

        filter.farmer_id.is_none_or(|id| self.farmer_id == id)
            && filter.min_price.is_none_or(|min| self.price >= min)
            && filter.max_price.is_none_or(|max| self.price <= max)
            && (filter.in_stock != Some(true) || self.quantity > 0)
            && search.is_none_or(|needle| {
                self.name.to_lowercase().contains(&needle)
                    || self.description.to_lowercase().contains(&needle)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tomatoes() -> Product {
        Product::new(
            Uuid::now_v7(),
            CreateProduct {
                name: "Roma Tomatoes".to_string(),
                description: "Firm, good for stew".to_string(),
                price: 1500,
                quantity: 40,
                location: None,
            },
            vec![],
        )
    }

    #[test]
    fn new_product_defaults() {
        let product = tomatoes();
        assert_eq!(product.location, GeoPoint::default());
        assert_eq!(product.ratings_count, 0);
    }

    #[test]
    fn apply_update_is_partial() {
        let mut product = tomatoes();
        product.apply_update(UpdateProduct {
            quantity: Some(0),
            ..Default::default()
        });

        assert_eq!(product.quantity, 0);
        assert_eq!(product.price, 1500);
        assert_eq!(product.name, "Roma Tomatoes");
    }

    #[test]
    fn filter_matching() {
        let product = tomatoes();

        assert!(product.matches(&ProductFilter::default()));
        assert!(product.matches(&ProductFilter {
            search: Some("STEW".to_string()),
            ..Default::default()
        }));
        assert!(!product.matches(&ProductFilter {
            max_price: Some(1000),
            ..Default::default()
        }));
        assert!(!product.matches(&ProductFilter {
            farmer_id: Some(Uuid::now_v7()),
            ..Default::default()
        }));
    }

    #[test]
    fn invalid_price_fails_validation() {
        let input = CreateProduct {
            name: "Yam".to_string(),
            price: -1,
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }
}
