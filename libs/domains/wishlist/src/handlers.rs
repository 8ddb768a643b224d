//! HTTP handlers for the wishlist API. Every route acts on the caller's own
//! wishlist.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use axum_helpers::{
    AppError, CurrentUser, UuidPath,
    errors::responses::{
        BadRequestUuidResponse, ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
};
use domain_products::{Product, ProductRepository};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{AddToWishlist, WishlistCheck, WishlistEntry, WishlistItem, WishlistRemoved};
use crate::repository::WishlistRepository;
use crate::service::WishlistService;

#[derive(OpenApi)]
#[openapi(
    paths(add, list, remove, check),
    components(
        schemas(AddToWishlist, WishlistEntry, WishlistItem, WishlistCheck, WishlistRemoved, Product),
        responses(
            BadRequestUuidResponse,
            UnauthorizedResponse,
            NotFoundResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Wishlist", description = "Products saved by the signed-in user")
    )
)]
pub struct ApiDoc;

type Service<W, P> = State<Arc<WishlistService<W, P>>>;

/// Routes mounted under `/wishlist`
pub fn router<W, P>(service: WishlistService<W, P>) -> Router
where
    W: WishlistRepository + 'static,
    P: ProductRepository + 'static,
{
    Router::new()
        .route("/", get(list).post(add))
        .route("/{product_id}", delete(remove))
        .route("/check/{product_id}", get(check))
        .with_state(Arc::new(service))
}

#[utoipa::path(
    post,
    path = "",
    tag = "Wishlist",
    request_body = AddToWishlist,
    responses(
        (status = 201, description = "Product saved", body = WishlistEntry),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn add<W: WishlistRepository, P: ProductRepository>(
    State(service): Service<W, P>,
    caller: CurrentUser,
    Json(input): Json<AddToWishlist>,
) -> Result<impl IntoResponse, AppError> {
    let entry = service.add(caller.id, input.product_id).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "",
    tag = "Wishlist",
    responses(
        (status = 200, description = "Saved products, newest first", body = Vec<WishlistItem>),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn list<W: WishlistRepository, P: ProductRepository>(
    State(service): Service<W, P>,
    caller: CurrentUser,
) -> Result<Json<Vec<WishlistItem>>, AppError> {
    Ok(Json(service.list_for_user(caller.id).await?))
}

#[utoipa::path(
    delete,
    path = "/{product_id}",
    tag = "Wishlist",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product removed", body = WishlistRemoved),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn remove<W: WishlistRepository, P: ProductRepository>(
    State(service): Service<W, P>,
    caller: CurrentUser,
    UuidPath(product_id): UuidPath,
) -> Result<Json<WishlistRemoved>, AppError> {
    service.remove(caller.id, product_id).await?;
    Ok(Json(WishlistRemoved {
        message: "Product removed from wishlist".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/check/{product_id}",
    tag = "Wishlist",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Whether the product is saved", body = WishlistCheck),
        (status = 400, response = BadRequestUuidResponse)
    )
)]
async fn check<W: WishlistRepository, P: ProductRepository>(
    State(service): Service<W, P>,
    caller: CurrentUser,
    UuidPath(product_id): UuidPath,
) -> Result<Json<WishlistCheck>, AppError> {
    let in_wishlist = service.contains(caller.id, product_id).await?;
    Ok(Json(WishlistCheck { in_wishlist }))
}
