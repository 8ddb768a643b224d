use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ApplicationError, ApplicationResult};
use crate::models::{
    ApplicationFilter, ApplicationStatus, FarmerApplication, UpdateApplicationDetails,
};

/// Repository trait for FarmerApplication persistence
///
/// A user may hold at most one application whose status is active
/// (pending or approved). Writes that would break this fail with
/// [`ApplicationError::ActiveApplicationExists`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn create(
        &self,
        application: FarmerApplication,
    ) -> ApplicationResult<FarmerApplication>;

    async fn get_by_id(&self, id: Uuid) -> ApplicationResult<Option<FarmerApplication>>;

    /// The user's pending or approved application, if any
    async fn find_active_for_user(
        &self,
        user_id: Uuid,
    ) -> ApplicationResult<Option<FarmerApplication>>;

    /// Newest first
    async fn list(&self, filter: ApplicationFilter) -> ApplicationResult<Vec<FarmerApplication>>;

    /// Newest first
    async fn list_by_user(&self, user_id: Uuid) -> ApplicationResult<Vec<FarmerApplication>>;

    /// Returns the updated application, or `None` if it does not exist
    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> ApplicationResult<Option<FarmerApplication>>;

    /// Returns the updated application, or `None` if it does not exist
    async fn update_details(
        &self,
        id: Uuid,
        details: UpdateApplicationDetails,
    ) -> ApplicationResult<Option<FarmerApplication>>;

    /// Returns `false` if nothing was deleted
    async fn delete(&self, id: Uuid) -> ApplicationResult<bool>;

    /// Count all applications, or only those with `status`
    async fn count(&self, status: Option<ApplicationStatus>) -> ApplicationResult<u64>;
}

/// In-memory implementation of ApplicationRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryApplicationRepository {
    applications: Arc<RwLock<HashMap<Uuid, FarmerApplication>>>,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn has_other_active(
    applications: &HashMap<Uuid, FarmerApplication>,
    user_id: Uuid,
    except: Uuid,
) -> bool {
    applications
        .values()
        .any(|a| a.user_id == user_id && a.id != except && a.status.is_active())
}

fn newest_first(mut applications: Vec<FarmerApplication>) -> Vec<FarmerApplication> {
    applications.sort_by(|a, b| b.id.cmp(&a.id));
    applications
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn create(
        &self,
        application: FarmerApplication,
    ) -> ApplicationResult<FarmerApplication> {
        let mut applications = self.applications.write().await;

        if application.status.is_active()
            && has_other_active(&applications, application.user_id, application.id)
        {
            return Err(ApplicationError::ActiveApplicationExists);
        }

        applications.insert(application.id, application.clone());
        Ok(application)
    }

    async fn get_by_id(&self, id: Uuid) -> ApplicationResult<Option<FarmerApplication>> {
        let applications = self.applications.read().await;
        Ok(applications.get(&id).cloned())
    }

    async fn find_active_for_user(
        &self,
        user_id: Uuid,
    ) -> ApplicationResult<Option<FarmerApplication>> {
        let applications = self.applications.read().await;
        Ok(applications
            .values()
            .find(|a| a.user_id == user_id && a.status.is_active())
            .cloned())
    }

    async fn list(&self, filter: ApplicationFilter) -> ApplicationResult<Vec<FarmerApplication>> {
        let applications = self.applications.read().await;
        let matching = applications
            .values()
            .filter(|a| filter.status.is_none_or(|s| a.status == s))
            .cloned()
            .collect();

        Ok(newest_first(matching)
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn list_by_user(&self, user_id: Uuid) -> ApplicationResult<Vec<FarmerApplication>> {
        let applications = self.applications.read().await;
        let matching = applications
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(matching))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> ApplicationResult<Option<FarmerApplication>> {
        let mut applications = self.applications.write().await;

        let Some(user_id) = applications.get(&id).map(|a| a.user_id) else {
            return Ok(None);
        };
        if status.is_active() && has_other_active(&applications, user_id, id) {
            return Err(ApplicationError::ActiveApplicationExists);
        }

        Ok(applications.get_mut(&id).map(|application| {
            application.status = status;
            application.updated_at = chrono::Utc::now();
            application.clone()
        }))
    }

    async fn update_details(
        &self,
        id: Uuid,
        details: UpdateApplicationDetails,
    ) -> ApplicationResult<Option<FarmerApplication>> {
        let mut applications = self.applications.write().await;
        Ok(applications.get_mut(&id).map(|application| {
            application.apply_details(details);
            application.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> ApplicationResult<bool> {
        let mut applications = self.applications.write().await;
        Ok(applications.remove(&id).is_some())
    }

    async fn count(&self, status: Option<ApplicationStatus>) -> ApplicationResult<u64> {
        let applications = self.applications.read().await;
        Ok(applications
            .values()
            .filter(|a| status.is_none_or(|s| a.status == s))
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApplicationDetails;

    fn application(user_id: Uuid) -> FarmerApplication {
        FarmerApplication::new(
            user_id,
            ApplicationDetails {
                business_name: "Rift Valley Dairy".to_string(),
                business_address: "Nakuru".to_string(),
                business_phone: "+254711000000".to_string(),
                business_email: "dairy@rift.ke".to_string(),
                business_description: "Milk".to_string(),
                certifications: None,
                experience: None,
                products: None,
                id_card_url: None,
                proof_of_farm_url: None,
            },
        )
    }

    #[tokio::test]
    async fn test_second_active_application_rejected() {
        let repo = InMemoryApplicationRepository::new();
        let user_id = Uuid::now_v7();

        repo.create(application(user_id)).await.unwrap();
        let result = repo.create(application(user_id)).await;

        assert!(matches!(
            result,
            Err(ApplicationError::ActiveApplicationExists)
        ));
    }

    #[tokio::test]
    async fn test_rejected_application_frees_the_slot() {
        let repo = InMemoryApplicationRepository::new();
        let user_id = Uuid::now_v7();

        let first = repo.create(application(user_id)).await.unwrap();
        repo.update_status(first.id, ApplicationStatus::Rejected)
            .await
            .unwrap();
        let second = repo.create(application(user_id)).await.unwrap();

        let active = repo.find_active_for_user(user_id).await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
        assert_eq!(repo.count(None).await.unwrap(), 2);
        assert_eq!(
            repo.count(Some(ApplicationStatus::Rejected)).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_list_filters_and_pages_newest_first() {
        let repo = InMemoryApplicationRepository::new();
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(repo.create(application(Uuid::now_v7())).await.unwrap().id);
        }
        repo.update_status(ids[0], ApplicationStatus::Approved)
            .await
            .unwrap();

        let page = repo
            .list(ApplicationFilter {
                status: Some(ApplicationStatus::Pending),
                limit: 1,
                offset: 0,
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, ids[2]);
    }

    #[tokio::test]
    async fn test_missing_application() {
        let repo = InMemoryApplicationRepository::new();
        let id = Uuid::now_v7();

        assert!(
            repo.update_status(id, ApplicationStatus::Approved)
                .await
                .unwrap()
                .is_none()
        );
        assert!(!repo.delete(id).await.unwrap());
    }
}
