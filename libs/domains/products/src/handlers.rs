//! HTTP handlers for the products API
//!
//! Listing and lookup are public. Creating a product takes a multipart form
//! with text fields plus one or more `image` files.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AppError, CurrentUser, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use domain_users::GeoPoint;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{CreateProduct, ImageUpload, Product, ProductFilter, UpdateProduct};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// Largest accepted image, in bytes
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
/// Largest accepted create request
const MAX_FORM_BYTES: usize = 4 * MAX_IMAGE_BYTES;

/// OpenAPI documentation for the products API
#[derive(OpenApi)]
#[openapi(
    paths(list_products, get_product, create_product, update_product, delete_product),
    components(
        schemas(Product, CreateProduct, UpdateProduct, ProductFilter, GeoPoint),
        responses(
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Farm produce listings")
    )
)]
pub struct ApiDoc;

type Service<R> = State<Arc<ProductService<R>>>;

/// Routes mounted under `/products`
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
        .with_state(Arc::new(service))
}

#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(ProductFilter),
    responses(
        (status = 200, description = "Products, newest first", body = Vec<Product>)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): Service<R>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(service.list_products(filter).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): Service<R>,
    UuidPath(id): UuidPath,
) -> Result<Json<Product>, AppError> {
    Ok(Json(service.get_product(id).await?))
}

/// Create a product from `multipart/form-data`
///
/// Text fields: `name`, `description`, `price`, `quantity` and `location`
/// (a GeoJSON point as a JSON string). Files go in `image` or `images`.
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body(content = CreateProduct, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): Service<R>,
    caller: CurrentUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    caller.require_any_role(&["farmer", "admin"])?;

    let (input, uploads) = read_product_form(multipart).await?;
    let product = service.create_product(caller.id, input, uploads).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): Service<R>,
    caller: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> Result<Json<Product>, AppError> {
    let product = service.get_product(id).await?;
    caller.require_self_or_admin(product.farmer_id)?;
    Ok(Json(service.update_product(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): Service<R>,
    caller: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<StatusCode, AppError> {
    let product = service.get_product(id).await?;
    caller.require_self_or_admin(product.farmer_id)?;
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn read_product_form(
    mut multipart: Multipart,
) -> Result<(CreateProduct, Vec<ImageUpload>), AppError> {
    let mut input = CreateProduct::default();
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "image" || name == "images" {
            let content_type = field.content_type().unwrap_or_default().to_string();
            if !content_type.starts_with("image/") {
                return Err(AppError::BadRequest(
                    "Only image uploads are allowed".to_string(),
                ));
            }
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read {name}: {e}")))?;
            if bytes.len() > MAX_IMAGE_BYTES {
                return Err(AppError::BadRequest(format!(
                    "{filename} exceeds the {MAX_IMAGE_BYTES} byte image limit"
                )));
            }
            uploads.push(ImageUpload {
                filename,
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read {name}: {e}")))?;

        match name.as_str() {
            "name" => input.name = value,
            "description" => input.description = value,
            "price" => input.price = parse_number(&name, &value)?,
            "quantity" => input.quantity = parse_number(&name, &value)?,
            "location" => input.location = parse_location(&value),
            _ => tracing::debug!(field = %name, "Ignoring unknown form field"),
        }
    }

    Ok((input, uploads))
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{field} must be a whole number")))
}

/// A malformed location falls back to the default point instead of failing
/// the request.
fn parse_location(value: &str) -> Option<GeoPoint> {
    if value.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(value) {
        Ok(point) => Some(point),
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable location field, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        let point = parse_location(r#"{"type":"Point","coordinates":[7.49,9.07]}"#).unwrap();
        assert_eq!(point, GeoPoint::new(7.49, 9.07));
        assert!(parse_location("not json").is_none());
        assert!(parse_location("  ").is_none());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number::<i64>("price", " 1200 ").unwrap(), 1200);
        assert!(matches!(
            parse_number::<i32>("quantity", "lots"),
            Err(AppError::BadRequest(_))
        ));
    }
}
