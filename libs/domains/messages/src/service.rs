use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{MessageError, MessageResult};
use crate::models::{Message, MessageTarget, MessageThread, participant_key};
use crate::repository::MessageRepository;

/// Threads and messages between buyers and farmers
pub struct MessageService<R: MessageRepository> {
    repository: Arc<R>,
}

impl<R: MessageRepository> MessageService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// The thread between `buyer_id` and `farmer_id`, in either order,
    /// created if it does not exist yet. Racing creators all get the same
    /// thread.
    #[instrument(skip(self))]
    pub async fn ensure_thread(
        &self,
        buyer_id: Uuid,
        farmer_id: Uuid,
    ) -> MessageResult<MessageThread> {
        if buyer_id == farmer_id {
            return Err(MessageError::InvalidArgument(
                "A thread needs two different participants".to_string(),
            ));
        }

        let key = participant_key(buyer_id, farmer_id);
        if let Some(thread) = self.repository.find_thread_by_key(&key).await? {
            return Ok(thread);
        }

        match self
            .repository
            .create_thread(MessageThread::new(buyer_id, farmer_id))
            .await
        {
            Ok(thread) => Ok(thread),
            Err(MessageError::DuplicateThread(_)) => {
                tracing::debug!(participant_key = %key, "Thread created concurrently, reading it back");
                self.repository
                    .find_thread_by_key(&key)
                    .await?
                    .ok_or_else(|| {
                        MessageError::Database(format!("thread {key} vanished after conflict"))
                    })
            }
            Err(e) => Err(e),
        }
    }

    /// Store a message from `sender` and bump the thread's activity time.
    ///
    /// Both sender and receiver must belong to the target thread. The
    /// activity bump is best effort.
    #[instrument(skip(self, content))]
    pub async fn send_message(
        &self,
        sender: Uuid,
        target: MessageTarget,
        receiver: Uuid,
        content: String,
    ) -> MessageResult<Message> {
        let thread = match target {
            MessageTarget::ByThread(id) => self.get_thread(id).await?,
            MessageTarget::ByParticipants {
                buyer_id,
                farmer_id,
            } => {
                // Checked before the thread is created so a rejected send
                // writes nothing.
                if sender != buyer_id && sender != farmer_id {
                    return Err(MessageError::NotParticipant);
                }
                self.ensure_thread(buyer_id, farmer_id).await?
            }
        };

        if !thread.involves(sender) {
            return Err(MessageError::NotParticipant);
        }
        if sender == receiver || !thread.involves(receiver) {
            return Err(MessageError::InvalidArgument(
                "Receiver must be the other participant of the thread".to_string(),
            ));
        }

        let message = self
            .repository
            .create_message(Message::new(thread.id, sender, receiver, content))
            .await?;

        match self.repository.touch_thread(thread.id, message.created_at).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(thread_id = %thread.id, "Thread disappeared before activity update")
            }
            Err(e) => {
                tracing::warn!(thread_id = %thread.id, error = %e, "Failed to update thread activity")
            }
        }

        tracing::info!(message_id = %message.id, thread_id = %thread.id, "Message sent");
        Ok(message)
    }

    #[instrument(skip(self))]
    pub async fn get_thread(&self, id: Uuid) -> MessageResult<MessageThread> {
        self.repository
            .get_thread(id)
            .await?
            .ok_or(MessageError::ThreadNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn get_message(&self, id: Uuid) -> MessageResult<Message> {
        self.repository
            .get_message(id)
            .await?
            .ok_or(MessageError::MessageNotFound(id))
    }

    /// Most recently active first
    #[instrument(skip(self))]
    pub async fn list_threads_for_user(&self, user_id: Uuid) -> MessageResult<Vec<MessageThread>> {
        self.repository.list_threads_for_user(user_id).await
    }

    /// Oldest first
    #[instrument(skip(self))]
    pub async fn list_by_thread(&self, thread_id: Uuid) -> MessageResult<Vec<Message>> {
        self.repository.list_messages(thread_id).await
    }

    #[instrument(skip(self))]
    pub async fn mark_read(&self, id: Uuid) -> MessageResult<Message> {
        self.repository
            .mark_read(id)
            .await?
            .ok_or(MessageError::MessageNotFound(id))
    }

    /// Marks what `reader` received in the thread; zero matches is fine.
    #[instrument(skip(self))]
    pub async fn mark_thread_read(&self, thread_id: Uuid, reader: Uuid) -> MessageResult<u64> {
        let updated = self.repository.mark_thread_read(thread_id, reader).await?;
        tracing::debug!(%thread_id, %reader, updated, "Marked thread read");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn unread_count(&self, user_id: Uuid) -> MessageResult<u64> {
        self.repository.unread_count(user_id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_message(&self, id: Uuid) -> MessageResult<()> {
        if !self.repository.delete_message(id).await? {
            return Err(MessageError::MessageNotFound(id));
        }
        Ok(())
    }
}

impl<R: MessageRepository> Clone for MessageService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
