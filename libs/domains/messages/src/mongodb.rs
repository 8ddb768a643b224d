//! MongoDB implementation of MessageRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::mongodb::{is_duplicate_key, timestamp_bson, uuid_bson};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{MessageError, MessageResult};
use crate::models::{Message, MessageThread};
use crate::repository::MessageRepository;

#[derive(Clone)]
pub struct MongoMessageRepository {
    threads: Collection<MessageThread>,
    messages: Collection<Message>,
}

impl MongoMessageRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            threads: db.collection::<MessageThread>("message_threads"),
            messages: db.collection::<Message>("messages"),
        }
    }

    pub async fn init_indexes(&self) -> MessageResult<()> {
        let thread_indexes = vec![
            IndexModel::builder()
                .keys(doc! { "participant_key": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_participant_key_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "buyer_id": 1 })
                .options(IndexOptions::builder().name("idx_buyer".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "farmer_id": 1 })
                .options(IndexOptions::builder().name("idx_farmer".to_string()).build())
                .build(),
        ];

        let message_indexes = vec![
            IndexModel::builder()
                .keys(doc! { "thread_id": 1, "_id": 1 })
                .options(IndexOptions::builder().name("idx_thread".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "receiver_id": 1, "read": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_receiver_unread".to_string())
                        .build(),
                )
                .build(),
        ];

        self.threads.create_indexes(thread_indexes).await?;
        self.messages.create_indexes(message_indexes).await?;
        tracing::info!("Message indexes created successfully");
        Ok(())
    }

    fn unread_for(user_id: Uuid) -> Document {
        doc! { "receiver_id": uuid_bson(user_id), "read": false }
    }
}

#[async_trait]
impl MessageRepository for MongoMessageRepository {
    #[instrument(skip(self, thread), fields(thread_id = %thread.id))]
    async fn create_thread(&self, thread: MessageThread) -> MessageResult<MessageThread> {
        match self.threads.insert_one(&thread).await {
            Ok(_) => {
                tracing::info!(thread_id = %thread.id, "Thread created");
                Ok(thread)
            }
            Err(e) if is_duplicate_key(&e) => {
                Err(MessageError::DuplicateThread(thread.participant_key))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn find_thread_by_key(&self, key: &str) -> MessageResult<Option<MessageThread>> {
        Ok(self.threads.find_one(doc! { "participant_key": key }).await?)
    }

    #[instrument(skip(self))]
    async fn get_thread(&self, id: Uuid) -> MessageResult<Option<MessageThread>> {
        Ok(self.threads.find_one(doc! { "_id": uuid_bson(id) }).await?)
    }

    #[instrument(skip(self))]
    async fn list_threads_for_user(&self, user_id: Uuid) -> MessageResult<Vec<MessageThread>> {
        let filter = doc! {
            "$or": [
                { "buyer_id": uuid_bson(user_id) },
                { "farmer_id": uuid_bson(user_id) },
            ]
        };
        let cursor = self.threads.find(filter).await?;
        let mut threads: Vec<MessageThread> = cursor.try_collect().await?;

        // Timestamps are stored as strings; order on the parsed values
        threads.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(threads)
    }

    /// Compare-and-set on the value just read; `last_message_at` only moves
    /// forward.
    #[instrument(skip(self))]
    async fn touch_thread(&self, id: Uuid, at: DateTime<Utc>) -> MessageResult<bool> {
        loop {
            let Some(thread) = self.threads.find_one(doc! { "_id": uuid_bson(id) }).await? else {
                return Ok(false);
            };
            if thread.last_message_at >= at {
                return Ok(true);
            }

            let filter = doc! {
                "_id": uuid_bson(id),
                "last_message_at": timestamp_bson(thread.last_message_at),
            };
            let update = doc! {
                "$set": {
                    "last_message_at": timestamp_bson(at),
                    "updated_at": timestamp_bson(at),
                }
            };
            if self.threads.update_one(filter, update).await?.matched_count > 0 {
                return Ok(true);
            }
            tracing::debug!(thread_id = %id, "Thread activity changed concurrently, retrying");
        }
    }

    #[instrument(skip(self, message), fields(message_id = %message.id, thread_id = %message.thread_id))]
    async fn create_message(&self, message: Message) -> MessageResult<Message> {
        self.messages.insert_one(&message).await?;
        Ok(message)
    }

    #[instrument(skip(self))]
    async fn get_message(&self, id: Uuid) -> MessageResult<Option<Message>> {
        Ok(self.messages.find_one(doc! { "_id": uuid_bson(id) }).await?)
    }

    #[instrument(skip(self))]
    async fn list_messages(&self, thread_id: Uuid) -> MessageResult<Vec<Message>> {
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let cursor = self
            .messages
            .find(doc! { "thread_id": uuid_bson(thread_id) })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, id: Uuid) -> MessageResult<Option<Message>> {
        Ok(self
            .messages
            .find_one_and_update(doc! { "_id": uuid_bson(id) }, doc! { "$set": { "read": true } })
            .return_document(ReturnDocument::After)
            .await?)
    }

    #[instrument(skip(self))]
    async fn mark_thread_read(&self, thread_id: Uuid, reader: Uuid) -> MessageResult<u64> {
        let mut filter = Self::unread_for(reader);
        filter.insert("thread_id", uuid_bson(thread_id));

        let result = self
            .messages
            .update_many(filter, doc! { "$set": { "read": true } })
            .await?;
        Ok(result.modified_count)
    }

    #[instrument(skip(self))]
    async fn unread_count(&self, user_id: Uuid) -> MessageResult<u64> {
        Ok(self
            .messages
            .count_documents(Self::unread_for(user_id))
            .await?)
    }

    #[instrument(skip(self))]
    async fn delete_message(&self, id: Uuid) -> MessageResult<bool> {
        let result = self
            .messages
            .delete_one(doc! { "_id": uuid_bson(id) })
            .await?;
        Ok(result.deleted_count > 0)
    }
}
