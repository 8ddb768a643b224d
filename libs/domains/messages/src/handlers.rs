//! HTTP handlers for the messages API
//!
//! Threads and messages are visible to their two participants and to admins.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use axum_helpers::{
    AppError, CurrentUser, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::MessageError;
use crate::models::{
    CreateThreadRequest, MarkedRead, Message, MessageTarget, MessageThread, SendMessageRequest,
    UnreadCount,
};
use crate::repository::MessageRepository;
use crate::service::MessageService;

/// OpenAPI documentation for the messages API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_thread, list_threads, get_thread, thread_messages, mark_thread_read,
        send_message, unread_count, get_message, mark_read, delete_message
    ),
    components(
        schemas(
            MessageThread, Message, CreateThreadRequest, SendMessageRequest, UnreadCount,
            MarkedRead
        ),
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
        (name = "Messages", description = "Buyer and farmer conversations")
    )
)]
pub struct ApiDoc;

type Service<R> = State<Arc<MessageService<R>>>;

/// Routes mounted under `/messages`
pub fn router<R: MessageRepository + 'static>(service: MessageService<R>) -> Router {
    Router::new()
        .route("/", post(send_message))
        .route("/thread", post(create_thread))
        .route("/threads", get(list_threads))
        .route("/thread/{id}", get(get_thread))
        .route("/thread/{id}/messages", get(thread_messages))
        .route("/thread/{id}/mark-read", patch(mark_thread_read))
        .route("/unread/count", get(unread_count))
        .route("/{id}", get(get_message).delete(delete_message))
        .route("/{id}/read", patch(mark_read))
        .with_state(Arc::new(service))
}

fn require_participant(caller: &CurrentUser, involved: bool) -> Result<(), AppError> {
    if involved || caller.is_admin() {
        Ok(())
    } else {
        Err(MessageError::NotParticipant.into())
    }
}

/// Open (or reuse) the thread between a buyer and a farmer
#[utoipa::path(
    post,
    path = "/thread",
    tag = "Messages",
    request_body = CreateThreadRequest,
    responses(
        (status = 200, description = "Thread for the pair", body = MessageThread),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    )
)]
async fn create_thread<R: MessageRepository>(
    State(service): Service<R>,
    caller: CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateThreadRequest>,
) -> Result<Json<MessageThread>, AppError> {
    require_participant(
        &caller,
        caller.id == input.buyer_id || caller.id == input.farmer_id,
    )?;
    Ok(Json(
        service.ensure_thread(input.buyer_id, input.farmer_id).await?,
    ))
}

/// The caller's threads, most recently active first
#[utoipa::path(
    get,
    path = "/threads",
    tag = "Messages",
    responses(
        (status = 200, description = "Threads", body = Vec<MessageThread>),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn list_threads<R: MessageRepository>(
    State(service): Service<R>,
    caller: CurrentUser,
) -> Result<Json<Vec<MessageThread>>, AppError> {
    Ok(Json(service.list_threads_for_user(caller.id).await?))
}

#[utoipa::path(
    get,
    path = "/thread/{id}",
    tag = "Messages",
    params(
        ("id" = Uuid, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Thread found", body = MessageThread),
        (status = 400, response = BadRequestUuidResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_thread<R: MessageRepository>(
    State(service): Service<R>,
    caller: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<Json<MessageThread>, AppError> {
    let thread = service.get_thread(id).await?;
    require_participant(&caller, thread.involves(caller.id))?;
    Ok(Json(thread))
}

/// Messages in a thread, oldest first
#[utoipa::path(
    get,
    path = "/thread/{id}/messages",
    tag = "Messages",
    params(
        ("id" = Uuid, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Messages", body = Vec<Message>),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn thread_messages<R: MessageRepository>(
    State(service): Service<R>,
    caller: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<Json<Vec<Message>>, AppError> {
    let thread = service.get_thread(id).await?;
    require_participant(&caller, thread.involves(caller.id))?;
    Ok(Json(service.list_by_thread(id).await?))
}

/// Mark everything the caller received in a thread as read
#[utoipa::path(
    patch,
    path = "/thread/{id}/mark-read",
    tag = "Messages",
    params(
        ("id" = Uuid, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Number of messages marked", body = MarkedRead),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn mark_thread_read<R: MessageRepository>(
    State(service): Service<R>,
    caller: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<Json<MarkedRead>, AppError> {
    let updated = service.mark_thread_read(id, caller.id).await?;
    Ok(Json(MarkedRead { updated }))
}

/// Send a message, into an existing thread or to a buyer/farmer pair
#[utoipa::path(
    post,
    path = "",
    tag = "Messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn send_message<R: MessageRepository>(
    State(service): Service<R>,
    caller: CurrentUser,
    ValidatedJson(input): ValidatedJson<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let target = MessageTarget::try_from(&input)?;
    let message = service
        .send_message(caller.id, target, input.receiver_id, input.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Unread messages addressed to the caller
#[utoipa::path(
    get,
    path = "/unread/count",
    tag = "Messages",
    responses(
        (status = 200, description = "Unread count", body = UnreadCount),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn unread_count<R: MessageRepository>(
    State(service): Service<R>,
    caller: CurrentUser,
) -> Result<Json<UnreadCount>, AppError> {
    let count = service.unread_count(caller.id).await?;
    Ok(Json(UnreadCount { count }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Messages",
    params(
        ("id" = Uuid, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "Message found", body = Message),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_message<R: MessageRepository>(
    State(service): Service<R>,
    caller: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<Json<Message>, AppError> {
    let message = service.get_message(id).await?;
    require_participant(&caller, message.involves(caller.id))?;
    Ok(Json(message))
}

#[utoipa::path(
    patch,
    path = "/{id}/read",
    tag = "Messages",
    params(
        ("id" = Uuid, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "Message marked read", body = Message),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn mark_read<R: MessageRepository>(
    State(service): Service<R>,
    caller: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<Json<Message>, AppError> {
    let message = service.get_message(id).await?;
    require_participant(&caller, message.receiver_id == caller.id)?;
    Ok(Json(service.mark_read(id).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Messages",
    params(
        ("id" = Uuid, Path, description = "Message ID")
    ),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_message<R: MessageRepository>(
    State(service): Service<R>,
    caller: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<StatusCode, AppError> {
    let message = service.get_message(id).await?;
    require_participant(&caller, message.sender_id == caller.id)?;
    service.delete_message(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
