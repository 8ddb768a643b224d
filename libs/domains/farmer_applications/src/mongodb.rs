//! MongoDB implementation of ApplicationRepository

use async_trait::async_trait;
use chrono::Utc;
use database::mongodb::{is_duplicate_key, timestamp_bson, uuid_bson};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ApplicationError, ApplicationResult};
use crate::models::{
    ApplicationFilter, ApplicationStatus, FarmerApplication, UpdateApplicationDetails,
};
use crate::repository::ApplicationRepository;

/// MongoDB implementation of the ApplicationRepository
#[derive(Clone)]
pub struct MongoApplicationRepository {
    collection: Collection<FarmerApplication>,
}

impl MongoApplicationRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<FarmerApplication>("farmer_applications"),
        }
    }

    /// Create indexes, including the partial unique index that allows one
    /// active application per user. `$in` in a partial filter needs
    /// MongoDB 6.0+.
    pub async fn init_indexes(&self) -> ApplicationResult<()> {
        let active: Vec<String> = ApplicationStatus::ACTIVE
            .iter()
            .map(ToString::to_string)
            .collect();

        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "user_id": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .partial_filter_expression(doc! { "status": { "$in": active } })
                        .name("idx_user_active_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "user_id": 1, "_id": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_user_created".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "status": 1, "_id": -1 })
                .options(IndexOptions::builder().name("idx_status".to_string()).build())
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Farmer application indexes created successfully");
        Ok(())
    }

    fn status_filter(status: Option<ApplicationStatus>) -> Document {
        match status {
            Some(status) => doc! { "status": status.to_string() },
            None => doc! {},
        }
    }

    fn details_update(details: UpdateApplicationDetails) -> Document {
        let mut set = doc! { "updated_at": timestamp_bson(Utc::now()) };

        let fields = [
            ("business_name", details.business_name),
            ("business_address", details.business_address),
            ("business_phone", details.business_phone),
            ("business_email", details.business_email),
            ("business_description", details.business_description),
            ("certifications", details.certifications),
            ("experience", details.experience),
            ("products", details.products),
            ("id_card_url", details.id_card_url),
            ("proof_of_farm_url", details.proof_of_farm_url),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                set.insert(key, value);
            }
        }

        doc! { "$set": set }
    }

    async fn find_sorted(
        &self,
        filter: Document,
        options: FindOptions,
    ) -> ApplicationResult<Vec<FarmerApplication>> {
        let cursor = self.collection.find(filter).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl ApplicationRepository for MongoApplicationRepository {
    #[instrument(skip(self, application), fields(application_id = %application.id, user_id = %application.user_id))]
    async fn create(
        &self,
        application: FarmerApplication,
    ) -> ApplicationResult<FarmerApplication> {
        match self.collection.insert_one(&application).await {
            Ok(_) => {
                tracing::info!(application_id = %application.id, "Farmer application created");
                Ok(application)
            }
            Err(e) if is_duplicate_key(&e) => Err(ApplicationError::ActiveApplicationExists),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ApplicationResult<Option<FarmerApplication>> {
        Ok(self.collection.find_one(doc! { "_id": uuid_bson(id) }).await?)
    }

    #[instrument(skip(self))]
    async fn find_active_for_user(
        &self,
        user_id: Uuid,
    ) -> ApplicationResult<Option<FarmerApplication>> {
        let active: Vec<String> = ApplicationStatus::ACTIVE
            .iter()
            .map(ToString::to_string)
            .collect();
        let filter = doc! {
            "user_id": uuid_bson(user_id),
            "status": { "$in": active },
        };
        Ok(self.collection.find_one(filter).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: ApplicationFilter) -> ApplicationResult<Vec<FarmerApplication>> {
        let options = FindOptions::builder()
            .limit(filter.limit)
            .skip(filter.offset)
            .sort(doc! { "_id": -1 })
            .build();
        self.find_sorted(Self::status_filter(filter.status), options)
            .await
    }

    #[instrument(skip(self))]
    async fn list_by_user(&self, user_id: Uuid) -> ApplicationResult<Vec<FarmerApplication>> {
        let options = FindOptions::builder().sort(doc! { "_id": -1 }).build();
        self.find_sorted(doc! { "user_id": uuid_bson(user_id) }, options)
            .await
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> ApplicationResult<Option<FarmerApplication>> {
        let update = doc! {
            "$set": {
                "status": status.to_string(),
                "updated_at": timestamp_bson(Utc::now()),
            }
        };

        match self
            .collection
            .find_one_and_update(doc! { "_id": uuid_bson(id) }, update)
            .return_document(ReturnDocument::After)
            .await
        {
            Ok(updated) => Ok(updated),
            Err(e) if is_duplicate_key(&e) => Err(ApplicationError::ActiveApplicationExists),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, details))]
    async fn update_details(
        &self,
        id: Uuid,
        details: UpdateApplicationDetails,
    ) -> ApplicationResult<Option<FarmerApplication>> {
        Ok(self
            .collection
            .find_one_and_update(doc! { "_id": uuid_bson(id) }, Self::details_update(details))
            .return_document(ReturnDocument::After)
            .await?)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ApplicationResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": uuid_bson(id) })
            .await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn count(&self, status: Option<ApplicationStatus>) -> ApplicationResult<u64> {
        Ok(self
            .collection
            .count_documents(Self::status_filter(status))
            .await?)
    }
}
