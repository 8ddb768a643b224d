//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use chrono::Utc;
use database::mongodb::{is_duplicate_key, timestamp_bson, uuid_bson, uuids_bson};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserFilter, UserPatch};
use crate::repository::UserRepository;

/// MongoDB implementation of the UserRepository
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<User>("users"),
        }
    }

    /// Create the indexes the repository relies on.
    ///
    /// The unique email index is what keeps concurrent registrations from
    /// producing two accounts for one address.
    pub async fn init_indexes(&self) -> UserResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_email_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "location": "2dsphere" })
                .options(
                    IndexOptions::builder()
                        .name("idx_location_2dsphere".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "role": 1, "_id": -1 })
                .options(IndexOptions::builder().name("idx_role".to_string()).build())
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("User indexes created successfully");
        Ok(())
    }

    fn build_filter(filter: &UserFilter) -> Document {
        let mut doc = doc! {};
        if let Some(role) = filter.role {
            doc.insert("role", role.to_string());
        }
        doc
    }

    fn build_update(patch: &UserPatch) -> Document {
        let mut set = doc! { "updated_at": timestamp_bson(Utc::now()) };
        if let Some(role) = patch.role {
            set.insert("role", role.to_string());
        }
        if let Some(status) = patch.farmer_application_status {
            set.insert("farmer_application_status", status.to_string());
        }
        doc! { "$set": set }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: User) -> UserResult<User> {
        match self.collection.insert_one(&user).await {
            Ok(_) => {
                tracing::info!(user_id = %user.id, "User created successfully");
                Ok(user)
            }
            Err(e) if is_duplicate_key(&e) => Err(UserError::DuplicateEmail(user.email)),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": uuid_bson(id) }).await?)
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn get_by_ids(&self, ids: &[Uuid]) -> UserResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": uuids_bson(ids) } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let options = FindOptions::builder()
            .limit(filter.limit)
            .skip(filter.offset)
            .sort(doc! { "_id": -1 })
            .build();

        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn update(&self, id: Uuid, patch: UserPatch) -> UserResult<Option<User>> {
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": uuid_bson(id) }, Self::build_update(&patch))
            .return_document(ReturnDocument::After)
            .await?;

        if updated.is_some() {
            tracing::info!(user_id = %id, "User updated successfully");
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let count = self
            .collection
            .count_documents(doc! { "email": email })
            .limit(1)
            .await?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FarmerApplicationStatus, Role};

    #[test]
    fn test_build_filter_empty() {
        let doc = MongoUserRepository::build_filter(&UserFilter::default());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_with_role() {
        let filter = UserFilter {
            role: Some(Role::Farmer),
            ..Default::default()
        };
        let doc = MongoUserRepository::build_filter(&filter);
        assert_eq!(doc.get_str("role").unwrap(), "farmer");
    }

    #[test]
    fn test_build_update_sets_only_patched_fields() {
        let patch = UserPatch {
            farmer_application_status: Some(FarmerApplicationStatus::Approved),
            role: Some(Role::Farmer),
        };
        let update = MongoUserRepository::build_update(&patch);
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get_str("role").unwrap(), "farmer");
        assert_eq!(set.get_str("farmer_application_status").unwrap(), "approved");
        assert!(set.contains_key("updated_at"));
    }

    #[test]
    fn test_build_update_without_fields_only_touches_timestamp() {
        let update = MongoUserRepository::build_update(&UserPatch::default());
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.len(), 1);
    }
}
