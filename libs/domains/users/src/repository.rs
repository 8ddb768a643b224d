use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserFilter, UserPatch};

/// Repository trait for User persistence
///
/// Implementations must enforce email uniqueness themselves and report a
/// clash as [`UserError::DuplicateEmail`], whatever the race.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user whose email is already normalized
    async fn create(&self, user: User) -> UserResult<User>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Exact match on the normalized email
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    async fn get_by_ids(&self, ids: &[Uuid]) -> UserResult<Vec<User>>;

    /// Newest first
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>>;

    /// Apply a partial update, returning the updated record or `None`
    async fn update(&self, id: Uuid, patch: UserPatch) -> UserResult<Option<User>>;

    async fn email_exists(&self, email: &str) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users
            .values()
            .filter(|u| filter.role.is_none_or(|role| u.role == role))
            .cloned()
            .collect();

        result.sort_by(|a, b| b.id.cmp(&a.id));

        Ok(result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> UserResult<Option<User>> {
        let mut users = self.users.write().await;

        Ok(users.get_mut(&id).map(|user| {
            user.apply_patch(patch);
            user.clone()
        }))
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.email == email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FarmerApplicationStatus, NewUser, Role};

    fn user(email: &str) -> User {
        User::new(NewUser {
            firstname: "Test".to_string(),
            lastname: "User".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::Buyer,
            location: None,
        })
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("dup@example.com")).await.unwrap();

        let result = repo.create(user("DUP@example.com ")).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_concurrent_creates_keep_one_record() {
        let repo = InMemoryUserRepository::new();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.create(user("race@example.com")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert!(repo.email_exists("race@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_missing_user_returns_none() {
        let repo = InMemoryUserRepository::new();
        let patch = UserPatch {
            farmer_application_status: Some(FarmerApplicationStatus::Pending),
            ..Default::default()
        };
        assert!(repo.update(Uuid::now_v7(), patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_role_newest_first() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create(user("first@example.com")).await.unwrap();
        let second = repo.create(user("second@example.com")).await.unwrap();
        let farmer = repo.create(user("farmer@example.com")).await.unwrap();
        repo.update(
            farmer.id,
            UserPatch {
                role: Some(Role::Farmer),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let buyers = repo
            .list(UserFilter {
                role: Some(Role::Buyer),
                ..Default::default()
            })
            .await
            .unwrap();

        let ids: Vec<Uuid> = buyers.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }
}
