//! Messages Domain
//!
//! Conversations between buyers and farmers.
//!
//! - One thread per unordered pair of users, backed by a unique
//!   `participant_key`; concurrent creators converge on the same thread
//! - A message is sent either into a known thread or to a participant pair,
//!   in which case the thread is created on demand
//! - Read flags only ever go from unread to read

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{MessageError, MessageResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateThreadRequest, MarkedRead, Message, MessageTarget, MessageThread, SendMessageRequest,
    UnreadCount, participant_key,
};
pub use mongodb::MongoMessageRepository;
pub use repository::{InMemoryMessageRepository, MessageRepository};
pub use service::MessageService;
