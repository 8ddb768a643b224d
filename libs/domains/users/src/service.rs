use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User, UserFilter, UserPatch, UserSummary, normalize_email};
use crate::repository::UserRepository;

/// Identity store: owns user records, including the role and
/// farmer-application status other domains write back to.
///
/// Nothing here retries; callers decide whether a failure is fatal to them.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Persist a new user under its normalized email.
    ///
    /// A clash found by the pre-check and one reported by the store both
    /// come back as [`UserError::DuplicateEmail`].
    #[instrument(skip(self, input))]
    pub async fn create_user(&self, mut input: NewUser) -> UserResult<User> {
        input.email = normalize_email(&input.email);

        if self.repository.email_exists(&input.email).await? {
            return Err(UserError::DuplicateEmail(input.email));
        }

        self.repository.create(User::new(input)).await
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        self.repository.get_by_email(&normalize_email(email)).await
    }

    /// An empty patch reads the user back without writing.
    #[instrument(skip(self))]
    pub async fn update_user(&self, id: Uuid, patch: UserPatch) -> UserResult<User> {
        if patch.is_empty() {
            return self.get_user(id).await;
        }
        self.repository
            .update(id, patch)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        self.repository.list(filter).await
    }

    /// Summaries for whichever of `ids` exist; unknown ids are skipped.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> UserResult<Vec<UserSummary>> {
        let users = self.repository.get_by_ids(ids).await?;
        Ok(users.iter().map(UserSummary::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn email_exists(&self, email: &str) -> UserResult<bool> {
        self.repository.email_exists(&normalize_email(email)).await
    }
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FarmerApplicationStatus, Role};
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use mockall::predicate::eq;

    fn candidate(email: &str) -> NewUser {
        NewUser {
            firstname: "Amina".to_string(),
            lastname: "Bello".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::Buyer,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_create_user_normalizes_email() {
        let service = UserService::new(InMemoryUserRepository::new());

        let user = service
            .create_user(candidate("  Amina@Farm.NG "))
            .await
            .unwrap();

        assert_eq!(user.email, "amina@farm.ng");
        let found = service.find_by_email("AMINA@farm.ng").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_create_user_rejects_case_insensitive_duplicate() {
        let service = UserService::new(InMemoryUserRepository::new());
        service.create_user(candidate("a@b.com")).await.unwrap();

        let result = service.create_user(candidate("A@B.COM")).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_store_level_duplicate_converges_on_same_error() {
        // Pre-check passes, the store then reports the clash (lost race)
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_email_exists()
            .with(eq("late@b.com"))
            .returning(|_| Ok(false));
        mock_repo
            .expect_create()
            .returning(|user| Err(UserError::DuplicateEmail(user.email)));

        let service = UserService::new(mock_repo);
        let result = service.create_user(candidate("Late@B.com")).await;

        match result {
            Err(UserError::DuplicateEmail(email)) => assert_eq!(email, "late@b.com"),
            other => panic!("expected DuplicateEmail, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_user_not_found() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_update().returning(|_, _| Ok(None));

        let service = UserService::new(mock_repo);
        let id = Uuid::now_v7();
        let result = service
            .update_user(
                id,
                UserPatch {
                    role: Some(Role::Farmer),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(UserError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn test_empty_patch_skips_the_write() {
        let user = User::new(candidate("e@b.com"));
        let id = user.id;

        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_update().times(0);
        mock_repo
            .expect_get_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(mock_repo);
        let found = service.update_user(id, UserPatch::default()).await.unwrap();
        assert_eq!(found.id, id);
    }

    #[tokio::test]
    async fn test_update_user_applies_partial_patch() {
        let service = UserService::new(InMemoryUserRepository::new());
        let user = service.create_user(candidate("p@b.com")).await.unwrap();

        let updated = service
            .update_user(
                user.id,
                UserPatch {
                    farmer_application_status: Some(FarmerApplicationStatus::Pending),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, Role::Buyer);
        assert_eq!(
            updated.farmer_application_status,
            FarmerApplicationStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_unknown() {
        let service = UserService::new(InMemoryUserRepository::new());
        let user = service.create_user(candidate("s@b.com")).await.unwrap();

        let summaries = service
            .find_by_ids(&[user.id, Uuid::now_v7()])
            .await
            .unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].email, "s@b.com");
    }
}
