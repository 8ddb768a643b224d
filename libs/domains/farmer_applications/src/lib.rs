//! Farmer Applications Domain
//!
//! A buyer asks to become a farmer; an admin approves or rejects. Every
//! status change is mirrored onto the applicant's user record.
//!
//! - At most one pending or approved application per user, enforced by the
//!   store (partial unique index in MongoDB)
//! - A rejected applicant may apply again
//! - Approval promotes the user to the `farmer` role

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{ApplicationError, ApplicationResult};
pub use handlers::ApiDoc;
pub use models::{
    ApplicationDetails, ApplicationFilter, ApplicationStats, ApplicationStatus,
    ApplicationWithApplicant, FarmerApplication, StatusUpdate, UpdateApplicationDetails,
};
pub use mongodb::MongoApplicationRepository;
pub use repository::{ApplicationRepository, InMemoryApplicationRepository};
pub use service::ApplicationService;
