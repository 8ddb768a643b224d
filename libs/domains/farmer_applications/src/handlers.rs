//! HTTP handlers for the farmer applications API

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use axum_helpers::{
    AppError, CurrentUser, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
        PartialUpdateFailureResponse, UnauthorizedResponse,
    },
};
use domain_users::{UserRepository, UserSummary};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{
    ApplicationDetails, ApplicationFilter, ApplicationStats, ApplicationStatus,
    ApplicationWithApplicant, FarmerApplication, StatusUpdate, UpdateApplicationDetails,
};
use crate::repository::ApplicationRepository;
use crate::service::ApplicationService;

/// OpenAPI documentation for the farmer applications API
#[derive(OpenApi)]
#[openapi(
    paths(
        submit, find_all, stats, find_by_user, find_one, update_details, set_status, remove
    ),
    components(
        schemas(
            FarmerApplication, ApplicationDetails, UpdateApplicationDetails, StatusUpdate,
            ApplicationStatus, ApplicationWithApplicant, ApplicationStats, UserSummary
        ),
        responses(
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            ConflictResponse,
            PartialUpdateFailureResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Farmer Applications", description = "Becoming a farmer and the admin review queue")
    )
)]
pub struct ApiDoc;

type Service<R, U> = State<Arc<ApplicationService<R, U>>>;

/// Routes mounted under `/farmer-applications`
pub fn router<R, U>(service: ApplicationService<R, U>) -> Router
where
    R: ApplicationRepository + 'static,
    U: UserRepository + 'static,
{
    Router::new()
        .route("/", get(find_all).post(submit))
        .route("/stats", get(stats))
        .route("/user/{user_id}", get(find_by_user))
        .route(
            "/{id}",
            get(find_one).patch(update_details).delete(remove),
        )
        .route("/{id}/status", patch(set_status))
        .with_state(Arc::new(service))
}

/// Submit an application for the caller
#[utoipa::path(
    post,
    path = "",
    tag = "Farmer Applications",
    request_body = ApplicationDetails,
    responses(
        (status = 201, description = "Application submitted", body = FarmerApplication),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = PartialUpdateFailureResponse)
    )
)]
async fn submit<R: ApplicationRepository, U: UserRepository>(
    State(service): Service<R, U>,
    caller: CurrentUser,
    ValidatedJson(details): ValidatedJson<ApplicationDetails>,
) -> Result<impl IntoResponse, AppError> {
    let application = service.submit(caller.id, details).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// List applications with their applicants (admin only)
#[utoipa::path(
    get,
    path = "",
    tag = "Farmer Applications",
    params(ApplicationFilter),
    responses(
        (status = 200, description = "Applications, newest first", body = Vec<ApplicationWithApplicant>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn find_all<R: ApplicationRepository, U: UserRepository>(
    State(service): Service<R, U>,
    caller: CurrentUser,
    Query(filter): Query<ApplicationFilter>,
) -> Result<Json<Vec<ApplicationWithApplicant>>, AppError> {
    caller.require_admin()?;
    Ok(Json(service.find_all(filter).await?))
}

/// Counts per status (admin only)
#[utoipa::path(
    get,
    path = "/stats",
    tag = "Farmer Applications",
    responses(
        (status = 200, description = "Application counts", body = ApplicationStats),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    )
)]
async fn stats<R: ApplicationRepository, U: UserRepository>(
    State(service): Service<R, U>,
    caller: CurrentUser,
) -> Result<Json<ApplicationStats>, AppError> {
    caller.require_admin()?;
    Ok(Json(service.stats().await?))
}

/// A user's application history, newest first
#[utoipa::path(
    get,
    path = "/user/{user_id}",
    tag = "Farmer Applications",
    params(
        ("user_id" = Uuid, Path, description = "Applicant user ID")
    ),
    responses(
        (status = 200, description = "Applications, newest first", body = Vec<FarmerApplication>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    )
)]
async fn find_by_user<R: ApplicationRepository, U: UserRepository>(
    State(service): Service<R, U>,
    caller: CurrentUser,
    UuidPath(user_id): UuidPath,
) -> Result<Json<Vec<FarmerApplication>>, AppError> {
    caller.require_self_or_admin(user_id)?;
    Ok(Json(service.find_by_user(user_id).await?))
}

/// Get one application with its applicant
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Farmer Applications",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application found", body = ApplicationWithApplicant),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn find_one<R: ApplicationRepository, U: UserRepository>(
    State(service): Service<R, U>,
    caller: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<Json<ApplicationWithApplicant>, AppError> {
    let found = service.find_one(id).await?;
    caller.require_self_or_admin(found.application.user_id)?;
    Ok(Json(found))
}

/// Change business details; the status is untouched
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Farmer Applications",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = UpdateApplicationDetails,
    responses(
        (status = 200, description = "Application updated", body = FarmerApplication),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_details<R: ApplicationRepository, U: UserRepository>(
    State(service): Service<R, U>,
    caller: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateApplicationDetails>,
) -> Result<Json<FarmerApplication>, AppError> {
    let application = service.get(id).await?;
    caller.require_self_or_admin(application.user_id)?;
    Ok(Json(service.update_details(id, input).await?))
}

/// Approve, reject or reopen an application (admin only)
#[utoipa::path(
    patch,
    path = "/{id}/status",
    tag = "Farmer Applications",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Status changed", body = FarmerApplication),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = PartialUpdateFailureResponse)
    )
)]
async fn set_status<R: ApplicationRepository, U: UserRepository>(
    State(service): Service<R, U>,
    caller: CurrentUser,
    UuidPath(id): UuidPath,
    Json(input): Json<StatusUpdate>,
) -> Result<Json<FarmerApplication>, AppError> {
    caller.require_admin()?;
    Ok(Json(service.set_status(id, input.status).await?))
}

/// Delete an application
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Farmer Applications",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 204, description = "Application deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn remove<R: ApplicationRepository, U: UserRepository>(
    State(service): Service<R, U>,
    caller: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<StatusCode, AppError> {
    let application = service.get(id).await?;
    caller.require_self_or_admin(application.user_id)?;
    service.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
