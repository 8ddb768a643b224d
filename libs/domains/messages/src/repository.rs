use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{MessageError, MessageResult};
use crate::models::{Message, MessageThread};

/// Persistence for threads and their messages
///
/// `create_thread` must refuse a second thread for the same
/// `participant_key` with [`MessageError::DuplicateThread`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create_thread(&self, thread: MessageThread) -> MessageResult<MessageThread>;

    async fn find_thread_by_key(&self, key: &str) -> MessageResult<Option<MessageThread>>;

    async fn get_thread(&self, id: Uuid) -> MessageResult<Option<MessageThread>>;

    /// Threads the user takes part in, most recently active first
    async fn list_threads_for_user(&self, user_id: Uuid) -> MessageResult<Vec<MessageThread>>;

    /// Advance `last_message_at` to `at` unless it is already later; returns
    /// `false` if the thread is gone
    async fn touch_thread(&self, id: Uuid, at: DateTime<Utc>) -> MessageResult<bool>;

    async fn create_message(&self, message: Message) -> MessageResult<Message>;

    async fn get_message(&self, id: Uuid) -> MessageResult<Option<Message>>;

    /// Oldest first
    async fn list_messages(&self, thread_id: Uuid) -> MessageResult<Vec<Message>>;

    /// Returns the message after the update, or `None`
    async fn mark_read(&self, id: Uuid) -> MessageResult<Option<Message>>;

    /// Mark unread messages addressed to `reader` in the thread; returns how many
    async fn mark_thread_read(&self, thread_id: Uuid, reader: Uuid) -> MessageResult<u64>;

    async fn unread_count(&self, user_id: Uuid) -> MessageResult<u64>;

    async fn delete_message(&self, id: Uuid) -> MessageResult<bool>;
}

/// In-memory implementation of MessageRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryMessageRepository {
    threads: Arc<RwLock<HashMap<Uuid, MessageThread>>>,
    messages: Arc<RwLock<HashMap<Uuid, Message>>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create_thread(&self, thread: MessageThread) -> MessageResult<MessageThread> {
        let mut threads = self.threads.write().await;

        if threads
            .values()
            .any(|t| t.participant_key == thread.participant_key)
        {
            return Err(MessageError::DuplicateThread(thread.participant_key));
        }

        threads.insert(thread.id, thread.clone());
        Ok(thread)
    }

    async fn find_thread_by_key(&self, key: &str) -> MessageResult<Option<MessageThread>> {
        let threads = self.threads.read().await;
        Ok(threads.values().find(|t| t.participant_key == key).cloned())
    }

    async fn get_thread(&self, id: Uuid) -> MessageResult<Option<MessageThread>> {
        let threads = self.threads.read().await;
        Ok(threads.get(&id).cloned())
    }

    async fn list_threads_for_user(&self, user_id: Uuid) -> MessageResult<Vec<MessageThread>> {
        let threads = self.threads.read().await;
        let mut found: Vec<MessageThread> = threads
            .values()
            .filter(|t| t.involves(user_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(found)
    }

    async fn touch_thread(&self, id: Uuid, at: DateTime<Utc>) -> MessageResult<bool> {
        let mut threads = self.threads.write().await;
        Ok(threads
            .get_mut(&id)
            .map(|thread| {
                if at > thread.last_message_at {
                    thread.last_message_at = at;
                    thread.updated_at = at;
                }
            })
            .is_some())
    }

    async fn create_message(&self, message: Message) -> MessageResult<Message> {
        let mut messages = self.messages.write().await;
        messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn get_message(&self, id: Uuid) -> MessageResult<Option<Message>> {
        let messages = self.messages.read().await;
        Ok(messages.get(&id).cloned())
    }

    async fn list_messages(&self, thread_id: Uuid) -> MessageResult<Vec<Message>> {
        let messages = self.messages.read().await;
        let mut found: Vec<Message> = messages
            .values()
            .filter(|m| m.thread_id == thread_id)
            .cloned()
            .collect();
        found.sort_by_key(|m| m.id);
        Ok(found)
    }

    async fn mark_read(&self, id: Uuid) -> MessageResult<Option<Message>> {
        let mut messages = self.messages.write().await;
        Ok(messages.get_mut(&id).map(|message| {
            message.read = true;
            message.clone()
        }))
    }

    async fn mark_thread_read(&self, thread_id: Uuid, reader: Uuid) -> MessageResult<u64> {
        let mut messages = self.messages.write().await;
        let mut updated = 0;
        for message in messages
            .values_mut()
            .filter(|m| m.thread_id == thread_id && m.receiver_id == reader && !m.read)
        {
            message.read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn unread_count(&self, user_id: Uuid) -> MessageResult<u64> {
        let messages = self.messages.read().await;
        Ok(messages
            .values()
            .filter(|m| m.receiver_id == user_id && !m.read)
            .count() as u64)
    }

    async fn delete_message(&self, id: Uuid) -> MessageResult<bool> {
        let mut messages = self.messages.write().await;
        Ok(messages.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_one_thread_per_pair_in_either_order() {
        let repo = InMemoryMessageRepository::new();
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());

        repo.create_thread(MessageThread::new(a, b)).await.unwrap();
        let result = repo.create_thread(MessageThread::new(b, a)).await;

        assert!(matches!(result, Err(MessageError::DuplicateThread(_))));
    }

    #[tokio::test]
    async fn test_threads_ordered_by_activity() {
        let repo = InMemoryMessageRepository::new();
        let user = Uuid::now_v7();
        let older = repo
            .create_thread(MessageThread::new(user, Uuid::now_v7()))
            .await
            .unwrap();
        let newer = repo
            .create_thread(MessageThread::new(Uuid::now_v7(), user))
            .await
            .unwrap();

        repo.touch_thread(older.id, Utc::now() + Duration::seconds(5))
            .await
            .unwrap();

        let threads = repo.list_threads_for_user(user).await.unwrap();
        assert_eq!(
            threads.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![older.id, newer.id]
        );
    }

    #[tokio::test]
    async fn test_touch_thread_never_moves_backwards() {
        let repo = InMemoryMessageRepository::new();
        let thread = repo
            .create_thread(MessageThread::new(Uuid::now_v7(), Uuid::now_v7()))
            .await
            .unwrap();
        let later = Utc::now() + Duration::seconds(10);

        assert!(repo.touch_thread(thread.id, later).await.unwrap());
        assert!(repo.touch_thread(thread.id, later - Duration::seconds(5)).await.unwrap());

        let stored = repo.get_thread(thread.id).await.unwrap().unwrap();
        assert_eq!(stored.last_message_at, later);
        assert!(!repo.touch_thread(Uuid::now_v7(), later).await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_thread_read_only_touches_the_reader() {
        let repo = InMemoryMessageRepository::new();
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());
        let thread = repo.create_thread(MessageThread::new(a, b)).await.unwrap();

        repo.create_message(Message::new(thread.id, a, b, "hi".to_string()))
            .await
            .unwrap();
        repo.create_message(Message::new(thread.id, a, b, "there".to_string()))
            .await
            .unwrap();
        repo.create_message(Message::new(thread.id, b, a, "hello".to_string()))
            .await
            .unwrap();

        assert_eq!(repo.mark_thread_read(thread.id, b).await.unwrap(), 2);
        assert_eq!(repo.mark_thread_read(thread.id, b).await.unwrap(), 0);
        assert_eq!(repo.unread_count(b).await.unwrap(), 0);
        assert_eq!(repo.unread_count(a).await.unwrap(), 1);
    }
}
