//! Farmer application workflow
//!
//! Per user: `NONE → PENDING → {APPROVED, REJECTED}`. The application is
//! always written first and the owning user second; a failed second write
//! surfaces as [`ApplicationError::PartialUpdateFailure`] instead of being
//! swallowed.

use domain_users::{UserPatch, UserRepository, UserService, UserSummary};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ApplicationError, ApplicationResult};
use crate::models::{
    ApplicationDetails, ApplicationFilter, ApplicationStats, ApplicationStatus,
    ApplicationWithApplicant, FarmerApplication, UpdateApplicationDetails,
};
use crate::repository::ApplicationRepository;

pub struct ApplicationService<R: ApplicationRepository, U: UserRepository> {
    repository: Arc<R>,
    users: UserService<U>,
}

fn conflict_for(existing: &FarmerApplication) -> ApplicationError {
    match existing.status {
        ApplicationStatus::Approved => ApplicationError::AlreadyApproved,
        _ => ApplicationError::AlreadyPending,
    }
}

impl<R: ApplicationRepository, U: UserRepository> ApplicationService<R, U> {
    pub fn new(repository: R, users: UserService<U>) -> Self {
        Self {
            repository: Arc::new(repository),
            users,
        }
    }

    /// Submit a new application on behalf of `user_id`.
    ///
    /// A rejected application does not block resubmission.
    #[instrument(skip(self, details))]
    pub async fn submit(
        &self,
        user_id: Uuid,
        details: ApplicationDetails,
    ) -> ApplicationResult<FarmerApplication> {
        self.users.get_user(user_id).await?;

        if let Some(existing) = self.repository.find_active_for_user(user_id).await? {
            return Err(conflict_for(&existing));
        }

        let application = match self
            .repository
            .create(FarmerApplication::new(user_id, details))
            .await
        {
            Ok(application) => application,
            Err(ApplicationError::ActiveApplicationExists) => {
                // Lost a race with another submission; report what won.
                let existing = self.repository.find_active_for_user(user_id).await?;
                return Err(existing
                    .as_ref()
                    .map(conflict_for)
                    .unwrap_or(ApplicationError::AlreadyPending));
            }
            Err(e) => return Err(e),
        };

        self.write_back(&application, ApplicationStatus::Pending.user_patch())
            .await?;

        tracing::info!(application_id = %application.id, "Farmer application submitted");
        Ok(application)
    }

    /// Move an application to `status` and mirror it onto the owning user.
    ///
    /// Repeating a call with the same status is safe and retries the user
    /// update.
    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> ApplicationResult<FarmerApplication> {
        let application = self
            .repository
            .update_status(id, status)
            .await?
            .ok_or(ApplicationError::NotFound(id))?;

        self.write_back(&application, status.user_patch()).await?;

        tracing::info!(application_id = %id, %status, "Farmer application status changed");
        Ok(application)
    }

    async fn write_back(
        &self,
        application: &FarmerApplication,
        patch: UserPatch,
    ) -> ApplicationResult<()> {
        self.users
            .update_user(application.user_id, patch)
            .await
            .map(|_| ())
            .map_err(|e| {
                tracing::error!(
                    application_id = %application.id,
                    user_id = %application.user_id,
                    error = %e,
                    "Application saved but user update failed"
                );
                ApplicationError::PartialUpdateFailure {
                    application_id: application.id,
                    reason: e.to_string(),
                }
            })
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, id: Uuid) -> ApplicationResult<()> {
        if !self.repository.delete(id).await? {
            return Err(ApplicationError::NotFound(id));
        }
        tracing::info!(application_id = %id, "Farmer application removed");
        Ok(())
    }

    /// Applications with their applicants, newest first
    #[instrument(skip(self))]
    pub async fn find_all(
        &self,
        filter: ApplicationFilter,
    ) -> ApplicationResult<Vec<ApplicationWithApplicant>> {
        let applications = self.repository.list(filter).await?;
        self.with_applicants(applications).await
    }

    #[instrument(skip(self))]
    pub async fn find_one(&self, id: Uuid) -> ApplicationResult<ApplicationWithApplicant> {
        let application = self.get(id).await?;
        let mut resolved = self.with_applicants(vec![application]).await?;
        resolved.pop().ok_or(ApplicationError::NotFound(id))
    }

    /// Without applicant resolution; used for ownership checks.
    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> ApplicationResult<FarmerApplication> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ApplicationError::NotFound(id))
    }

    /// Newest first
    #[instrument(skip(self))]
    pub async fn find_by_user(&self, user_id: Uuid) -> ApplicationResult<Vec<FarmerApplication>> {
        self.repository.list_by_user(user_id).await
    }

    #[instrument(skip(self, details))]
    pub async fn update_details(
        &self,
        id: Uuid,
        details: UpdateApplicationDetails,
    ) -> ApplicationResult<FarmerApplication> {
        if details.is_empty() {
            return self.get(id).await;
        }

        self.repository
            .update_details(id, details)
            .await?
            .ok_or(ApplicationError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> ApplicationResult<ApplicationStats> {
        let (total, pending, approved, rejected) = tokio::try_join!(
            self.repository.count(None),
            self.repository.count(Some(ApplicationStatus::Pending)),
            self.repository.count(Some(ApplicationStatus::Approved)),
            self.repository.count(Some(ApplicationStatus::Rejected)),
        )?;

        Ok(ApplicationStats {
            total,
            pending,
            approved,
            rejected,
        })
    }

    async fn with_applicants(
        &self,
        applications: Vec<FarmerApplication>,
    ) -> ApplicationResult<Vec<ApplicationWithApplicant>> {
        let mut user_ids: Vec<Uuid> = applications.iter().map(|a| a.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let summaries: HashMap<Uuid, UserSummary> = self
            .users
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|summary| (summary.id, summary))
            .collect();

        Ok(applications
            .into_iter()
            .map(|application| ApplicationWithApplicant {
                applicant: summaries.get(&application.user_id).cloned(),
                application,
            })
            .collect())
    }
}

impl<R: ApplicationRepository, U: UserRepository> Clone for ApplicationService<R, U> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            users: self.users.clone(),
        }
    }
}
