//! SocialStore in-memory implementation.

use std::sync::RwLock;

use ahash::AHashMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::store::{PostFilter, SocialStore};
use crate::types::{
    Conversation, ConversationId, LastMessage, Message, MessageId, Post, PostId, Reply, UserId,
    UserSummary,
};

/// In-memory implementation for development and testing.
///
/// Posts are kept in insertion order; listing sorts newest first and breaks
/// timestamp ties by insertion order (later insert is newer).
#[derive(Default)]
pub struct InMemorySocialStore {
    users: RwLock<Vec<UserSummary>>,
    following: RwLock<AHashMap<UserId, Vec<UserId>>>,
    posts: RwLock<Vec<Post>>,
    conversations: RwLock<Vec<Conversation>>,
    messages: RwLock<Vec<Message>>,
}

fn poisoned<E: std::fmt::Display>(err: E) -> StoreError {
    StoreError::Internal(err.to_string())
}

impl InMemorySocialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: UserSummary) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(poisoned)?;
        if users.iter().any(|u| u.id == user.id) {
            return Err(StoreError::Conflict(format!("user {} exists", user.id)));
        }
        users.push(user);
        Ok(())
    }

    pub fn follow(&self, follower: &UserId, followee: &UserId) -> Result<(), StoreError> {
        let mut following = self.following.write().map_err(poisoned)?;
        let list = following.entry(follower.clone()).or_default();
        if !list.contains(followee) {
            list.push(followee.clone());
        }
        Ok(())
    }

    /// Insert a post with an explicit timestamp.
    pub fn insert_post(
        &self,
        author: &UserId,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Post, StoreError> {
        let posted_by = self
            .find_user(author)?
            .ok_or_else(|| StoreError::NotFound(format!("user {}", author)))?;
        let post = Post {
            id: PostId::generate(),
            posted_by,
            text: text.to_string(),
            likes: Vec::new(),
            replies: Vec::new(),
            created_at,
        };
        self.posts.write().map_err(poisoned)?.push(post.clone());
        Ok(post)
    }

    pub fn post(&self, id: &PostId) -> Result<Option<Post>, StoreError> {
        let posts = self.posts.read().map_err(poisoned)?;
        Ok(posts.iter().find(|p| &p.id == id).cloned())
    }

    pub fn conversations(&self) -> Result<Vec<Conversation>, StoreError> {
        Ok(self.conversations.read().map_err(poisoned)?.clone())
    }

    pub fn messages(&self) -> Result<Vec<Message>, StoreError> {
        Ok(self.messages.read().map_err(poisoned)?.clone())
    }

    fn find_user(&self, id: &UserId) -> Result<Option<UserSummary>, StoreError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.iter().find(|u| &u.id == id).cloned())
    }

    fn update_post<F>(&self, post_id: &PostId, update: F) -> Result<Post, StoreError>
    where
        F: FnOnce(&mut Post),
    {
        let mut posts = self.posts.write().map_err(poisoned)?;
        let post = posts
            .iter_mut()
            .find(|p| &p.id == post_id)
            .ok_or_else(|| StoreError::NotFound(format!("post {}", post_id)))?;
        update(post);
        Ok(post.clone())
    }
}

#[async_trait]
impl SocialStore for InMemorySocialStore {
    async fn get_user_by_id(&self, id: &UserId) -> Result<Option<UserSummary>, StoreError> {
        self.find_user(id)
    }

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserSummary>, StoreError> {
        let wanted = username.to_lowercase();
        let users = self.users.read().map_err(poisoned)?;
        Ok(users
            .iter()
            .find(|u| u.username.to_lowercase() == wanted)
            .cloned())
    }

    async fn list_all_users(&self) -> Result<Vec<UserSummary>, StoreError> {
        Ok(self.users.read().map_err(poisoned)?.clone())
    }

    async fn list_following(&self, user_id: &UserId) -> Result<Vec<UserId>, StoreError> {
        let following = self.following.read().map_err(poisoned)?;
        Ok(following.get(user_id).cloned().unwrap_or_default())
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        limit: usize,
    ) -> Result<Vec<Post>, StoreError> {
        let posts = self.posts.read().map_err(poisoned)?;
        let mut matching: Vec<(usize, &Post)> = posts
            .iter()
            .enumerate()
            .filter(|(_, p)| filter.matches(&p.posted_by.id))
            .collect();
        matching.sort_by(|(ia, a), (ib, b)| {
            b.created_at.cmp(&a.created_at).then_with(|| ib.cmp(ia))
        });
        Ok(matching
            .into_iter()
            .take(limit)
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn create_post(&self, author: &UserId, text: &str) -> Result<Post, StoreError> {
        self.insert_post(author, text, Utc::now())
    }

    async fn append_like(&self, post_id: &PostId, user_id: &UserId) -> Result<Post, StoreError> {
        self.update_post(post_id, |post| post.likes.push(user_id.clone()))
    }

    async fn append_reply(&self, post_id: &PostId, reply: Reply) -> Result<Post, StoreError> {
        self.update_post(post_id, |post| post.replies.push(reply))
    }

    async fn get_or_create_conversation(
        &self,
        participants: &[UserId],
        first_message: &LastMessage,
    ) -> Result<Conversation, StoreError> {
        let mut conversations = self.conversations.write().map_err(poisoned)?;
        if let Some(existing) = conversations
            .iter()
            .find(|c| participants.iter().all(|p| c.participants.contains(p)))
        {
            return Ok(existing.clone());
        }
        let conversation = Conversation {
            id: ConversationId::generate(),
            participants: participants.to_vec(),
            last_message: Some(first_message.clone()),
        };
        conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn create_message(
        &self,
        conversation_id: &ConversationId,
        sender: &UserId,
        text: &str,
    ) -> Result<Message, StoreError> {
        let message = Message {
            id: MessageId::generate(),
            conversation_id: conversation_id.clone(),
            sender: sender.clone(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        self.messages.write().map_err(poisoned)?.push(message.clone());
        Ok(message)
    }

    async fn update_conversation_last_message(
        &self,
        conversation_id: &ConversationId,
        last_message: LastMessage,
    ) -> Result<(), StoreError> {
        let mut conversations = self.conversations.write().map_err(poisoned)?;
        let conversation = conversations
            .iter_mut()
            .find(|c| &c.id == conversation_id)
            .ok_or_else(|| StoreError::NotFound(format!("conversation {}", conversation_id)))?;
        conversation.last_message = Some(last_message);
        Ok(())
    }
}
