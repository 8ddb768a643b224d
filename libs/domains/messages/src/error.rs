use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(Uuid),

    #[error("Message not found: {0}")]
    MessageNotFound(Uuid),

    /// The store already holds a thread for this participant pair.
    /// The service resolves it to the existing thread.
    #[error("Thread already exists for {0}")]
    DuplicateThread(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("You are not a participant in this conversation")]
    NotParticipant,

    #[error("Database error: {0}")]
    Database(String),
}

pub type MessageResult<T> = Result<T, MessageError>;

impl From<MessageError> for AppError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::ThreadNotFound(_) => AppError::NotFound("Thread not found".to_string()),
            MessageError::MessageNotFound(_) => {
                AppError::NotFound("Message not found".to_string())
            }
            MessageError::DuplicateThread(_) => AppError::Conflict(err.to_string()),
            MessageError::InvalidArgument(msg) => AppError::BadRequest(msg),
            MessageError::NotParticipant => AppError::Forbidden(err.to_string()),
            MessageError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for MessageError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for MessageError {
    fn from(err: mongodb::error::Error) -> Self {
        MessageError::Database(err.to_string())
    }
}
