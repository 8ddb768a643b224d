use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_users::UserError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("Farmer application not found: {0}")]
    NotFound(Uuid),

    #[error("You already have a pending application.")]
    AlreadyPending,

    #[error("You are already an approved farmer.")]
    AlreadyApproved,

    /// The store refused a second active application for the same user.
    #[error("User already has an active application")]
    ActiveApplicationExists,

    #[error("Applicant not found: {0}")]
    ApplicantNotFound(Uuid),

    /// The application was written but the owning user was not updated.
    /// Re-issuing the same status change retries the user update.
    #[error("Application {application_id} saved but the user update failed: {reason}")]
    PartialUpdateFailure { application_id: Uuid, reason: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

impl From<ApplicationError> for AppError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::NotFound(_) => {
                AppError::NotFound("Farmer application not found".to_string())
            }
            ApplicationError::AlreadyPending
            | ApplicationError::AlreadyApproved
            | ApplicationError::ActiveApplicationExists => AppError::Conflict(err.to_string()),
            ApplicationError::ApplicantNotFound(id) => {
                AppError::NotFound(format!("User {} not found", id))
            }
            ApplicationError::PartialUpdateFailure { application_id, .. } => {
                AppError::PartialUpdateFailure {
                    message: format!(
                        "Application {} was saved but the applicant's account was not updated. \
                         Retry the status change to complete it.",
                        application_id
                    ),
                    details: json!({ "application_id": application_id }),
                }
            }
            ApplicationError::Validation(msg) => AppError::BadRequest(msg),
            ApplicationError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ApplicationError {
    fn from(err: mongodb::error::Error) -> Self {
        ApplicationError::Database(err.to_string())
    }
}

impl From<UserError> for ApplicationError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => ApplicationError::ApplicantNotFound(id),
            other => ApplicationError::Database(other.to_string()),
        }
    }
}
