//! External collaborators: social-graph storage, realtime push and text generation
//!
//! Implementations live outside this crate, except [`InMemorySocialStore`]
//! which backs tests and local development.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{GenerationError, StoreError};
use crate::types::{
    Conversation, ConversationId, LastMessage, Message, Post, PostId, Reply, UserId, UserSummary,
};

pub use crate::memory::InMemorySocialStore;

/// Which authors a post listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    AuthorIn(Vec<UserId>),
    AuthorEq(UserId),
}

impl PostFilter {
    pub fn matches(&self, author: &UserId) -> bool {
        match self {
            Self::AuthorIn(ids) => ids.contains(author),
            Self::AuthorEq(id) => id == author,
        }
    }
}

/// Persistent store for users, posts, conversations and messages.
#[async_trait]
pub trait SocialStore: Send + Sync {
    async fn get_user_by_id(&self, id: &UserId) -> Result<Option<UserSummary>, StoreError>;

    /// Case-insensitive exact username lookup.
    async fn get_user_by_username(&self, username: &str)
        -> Result<Option<UserSummary>, StoreError>;

    async fn list_all_users(&self) -> Result<Vec<UserSummary>, StoreError>;

    async fn list_following(&self, user_id: &UserId) -> Result<Vec<UserId>, StoreError>;

    /// Posts matching `filter`, newest first, at most `limit`.
    async fn list_posts(&self, filter: &PostFilter, limit: usize)
        -> Result<Vec<Post>, StoreError>;

    async fn create_post(&self, author: &UserId, text: &str) -> Result<Post, StoreError>;

    /// Append `user_id` to the post's likes and return the updated post.
    async fn append_like(&self, post_id: &PostId, user_id: &UserId) -> Result<Post, StoreError>;

    async fn append_reply(&self, post_id: &PostId, reply: Reply) -> Result<Post, StoreError>;

    /// Existing conversation containing all participants, or a new one.
    async fn get_or_create_conversation(
        &self,
        participants: &[UserId],
        first_message: &LastMessage,
    ) -> Result<Conversation, StoreError>;

    async fn create_message(
        &self,
        conversation_id: &ConversationId,
        sender: &UserId,
        text: &str,
    ) -> Result<Message, StoreError>;

    async fn update_conversation_last_message(
        &self,
        conversation_id: &ConversationId,
        last_message: LastMessage,
    ) -> Result<(), StoreError>;
}

/// Best-effort push to a connected client.
#[async_trait]
pub trait RealtimeNotifier: Send + Sync {
    /// Returns whether the recipient was connected. Offline is not an error.
    async fn notify(&self, recipient: &UserId, event: &str, payload: Value) -> bool;
}

/// Notifier for deployments without realtime delivery.
pub struct NoopNotifier;

#[async_trait]
impl RealtimeNotifier for NoopNotifier {
    async fn notify(&self, _recipient: &UserId, _event: &str, _payload: Value) -> bool {
        false
    }
}

/// The generative-text backend. Its output is untrusted free text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError>;
}
