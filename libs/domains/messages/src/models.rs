use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::MessageError;

/// Conversation between two users; one per unordered pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MessageThread {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub farmer_id: Uuid,
    /// Both participant ids, sorted; unique across threads
    pub participant_key: String,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MessageThread {
    pub fn new(buyer_id: Uuid, farmer_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            buyer_id,
            farmer_id,
            participant_key: participant_key(buyer_id, farmer_id),
            last_message_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.buyer_id == user_id || self.farmer_id == user_id
    }
}

/// Order-independent key for a pair of users
pub fn participant_key(a: Uuid, b: Uuid) -> String {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    format!("{low}:{high}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Message {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub thread_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(thread_id: Uuid, sender_id: Uuid, receiver_id: Uuid, content: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            thread_id,
            sender_id,
            receiver_id,
            content,
            read: false,
            created_at: Utc::now(),
        }
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }
}

/// Where a new message goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTarget {
    /// An existing thread
    ByThread(Uuid),
    /// The thread between these two users, created if missing
    ByParticipants { buyer_id: Uuid, farmer_id: Uuid },
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateThreadRequest {
    pub buyer_id: Uuid,
    pub farmer_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SendMessageRequest {
    pub thread_id: Option<Uuid>,
    pub buyer_id: Option<Uuid>,
    pub farmer_id: Option<Uuid>,
    pub receiver_id: Uuid,
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

impl TryFrom<&SendMessageRequest> for MessageTarget {
    type Error = MessageError;

    fn try_from(request: &SendMessageRequest) -> Result<Self, Self::Error> {
        match (request.thread_id, request.buyer_id, request.farmer_id) {
            (Some(thread_id), _, _) => Ok(MessageTarget::ByThread(thread_id)),
            (None, Some(buyer_id), Some(farmer_id)) => Ok(MessageTarget::ByParticipants {
                buyer_id,
                farmer_id,
            }),
            _ => Err(MessageError::InvalidArgument(
                "Either thread_id or buyer_id and farmer_id must be provided".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct UnreadCount {
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct MarkedRead {
    pub updated: u64,
}
