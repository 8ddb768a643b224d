//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "AgroNet API",
        version = "0.1.0",
        description = "Marketplace backend connecting farmers and buyers"
    ),
    servers(
        (url = "http://localhost:3001", description = "Local development server")
    ),
    nest(
        (path = "/api/auth", api = domain_users::AuthApiDoc),
        (path = "/api/users", api = domain_users::ApiDoc),
        (path = "/api/farmer-applications", api = domain_farmer_applications::ApiDoc),
        (path = "/api/messages", api = domain_messages::ApiDoc),
        (path = "/api/products", api = domain_products::ApiDoc),
        (path = "/api/wishlist", api = domain_wishlist::ApiDoc)
    ),
    components(
        schemas(axum_helpers::ErrorResponse)
    )
)]
pub struct ApiDoc;
