//! Action dispatcher - routes a parsed intent to its executor
//!
//! Every intent first becomes a [`Command`], which exists only when the fields
//! its action needs are present. Executors catch their own failures and report
//! them as an unsuccessful [`ActionResult`]; nothing escapes as an error.
//!
//! Like and reply read the post, check it, then write it back without a lock.
//! Two concurrent likes on the same post can both pass the "already liked"
//! check; only the store's own atomic updates guard against that.

use std::sync::Arc;

use serde_json::Value;

use crate::config::CommandConfig;
use crate::error::StoreError;
use crate::matcher::find_users_with;
use crate::resolver::{find_post, ResolveError};
use crate::store::{PostFilter, RealtimeNotifier, SocialStore};
use crate::types::{
    ActionKind, ActionPayload, ActionResult, BestMatch, ConfidenceLabel, ConversationId, Intent,
    LastMessage, Post, PostBrief, PostSummary, Reply, UserId, UserSearch,
};

/// Which post a like or reply refers to. At least one field is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTarget {
    pub description: Option<String>,
    pub author_username: Option<String>,
}

impl PostTarget {
    fn from_intent(intent: &Intent) -> Option<Self> {
        if intent.post_description.is_none() && intent.author_username.is_none() {
            return None;
        }
        Some(Self {
            description: intent.post_description.clone(),
            author_username: intent.author_username.clone(),
        })
    }
}

/// An intent whose action has everything it needs to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Post { content: String },
    Read,
    Like { target: PostTarget },
    Reply { target: PostTarget, content: String },
    Message { username: String, content: String },
    FindUser { username: String },
    Chat,
}

impl Command {
    /// `None` when a required field is missing.
    pub fn from_intent(intent: &Intent) -> Option<Self> {
        match intent.action {
            ActionKind::Post => Some(Self::Post {
                content: intent.content.clone()?,
            }),
            ActionKind::Read => Some(Self::Read),
            ActionKind::Like => Some(Self::Like {
                target: PostTarget::from_intent(intent)?,
            }),
            ActionKind::Reply => {
                let content = intent.content.clone()?;
                Some(Self::Reply {
                    target: PostTarget::from_intent(intent)?,
                    content,
                })
            }
            ActionKind::Message => Some(Self::Message {
                username: intent.username.clone()?,
                content: intent.content.clone()?,
            }),
            ActionKind::FindUser => Some(Self::FindUser {
                username: intent.username.clone()?,
            }),
            ActionKind::Chat => Some(Self::Chat),
        }
    }
}

const NO_USER_SUGGESTIONS: [&str; 3] = [
    "Double-check the spelling",
    "Try searching with just the first few letters",
    "Use their display name instead of username",
];

/// First `max` characters of `text`, with `...` appended only when cut.
fn preview(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

fn head(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

pub struct ActionDispatcher {
    store: Arc<dyn SocialStore>,
    notifier: Arc<dyn RealtimeNotifier>,
    config: CommandConfig,
}

impl ActionDispatcher {
    pub fn new(
        store: Arc<dyn SocialStore>,
        notifier: Arc<dyn RealtimeNotifier>,
        config: CommandConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    /// Run the intent's action for `user_id`.
    ///
    /// Returns `None` for chat and for intents missing a required field.
    pub async fn dispatch(&self, user_id: &UserId, intent: &Intent) -> Option<ActionResult> {
        let Some(command) = Command::from_intent(intent) else {
            tracing::debug!(
                action = %intent.action,
                "intent missing required fields; nothing executed"
            );
            return None;
        };

        let result = match command {
            Command::Post { content } => self.create_post(user_id, &content).await,
            Command::Read => self.read_feed(user_id).await,
            Command::Like { target } => self.like_post(user_id, &target).await,
            Command::Reply { target, content } => {
                self.reply_to_post(user_id, &target, &content).await
            }
            Command::Message { username, content } => {
                self.send_message(user_id, &username, &content).await
            }
            Command::FindUser { username } => self.find_user(&username).await,
            Command::Chat => return None,
        };

        tracing::info!(
            user_id = %user_id,
            action = %intent.action,
            success = result.success,
            "action executed"
        );
        Some(result)
    }

    pub async fn create_post(&self, user_id: &UserId, text: &str) -> ActionResult {
        let posts = &self.config.posts;
        let content = if text.chars().count() < posts.short_post_chars {
            format!("{}{}", text, posts.short_post_suffix)
        } else {
            text.to_string()
        };

        match self.store.create_post(user_id, &content).await {
            Ok(post) => ActionResult::success(
                format!("Post created successfully! \"{}\"", preview(&content, 50)),
                ActionPayload::CreatedPost { post },
            ),
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "failed to create post");
                ActionResult::failure("Failed to create post. Please try again.")
            }
        }
    }

    pub async fn read_feed(&self, user_id: &UserId) -> ActionResult {
        match self.fetch_feed(user_id).await {
            Ok(posts) => {
                let summaries: Vec<PostSummary> = posts
                    .iter()
                    .map(|post| PostSummary {
                        id: post.id.clone(),
                        author: post.posted_by.username.clone(),
                        text: preview(&post.text, 100),
                        likes: post.likes.len(),
                        replies: post.replies.len(),
                        time_ago: post.created_at.format("%Y-%m-%d").to_string(),
                    })
                    .collect();
                let hint = if posts.is_empty() {
                    "Try following more users to see content in your feed."
                } else {
                    "Here are the latest updates!"
                };
                ActionResult::success(
                    format!(
                        "Found {} recent posts from people you follow. {}",
                        posts.len(),
                        hint
                    ),
                    ActionPayload::Feed { posts, summaries },
                )
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "failed to fetch feed");
                ActionResult::failure("Failed to fetch your feed. Please try again.")
            }
        }
    }

    async fn fetch_feed(&self, user_id: &UserId) -> Result<Vec<Post>, StoreError> {
        let following = self.store.list_following(user_id).await?;
        self.store
            .list_posts(&PostFilter::AuthorIn(following), self.config.posts.feed_limit)
            .await
    }

    async fn resolve(&self, user_id: &UserId, target: &PostTarget) -> Result<Post, ActionResult> {
        find_post(
            self.store.as_ref(),
            user_id,
            target.description.as_deref(),
            target.author_username.as_deref(),
            self.config.posts.candidate_window,
        )
        .await
        .map_err(|e| match e {
            ResolveError::NotFound(reason) => {
                tracing::debug!(user_id = %user_id, reason = %reason, "post not resolved");
                ActionResult::failure(reason.to_string())
            }
            ResolveError::Store(e) => {
                tracing::error!(user_id = %user_id, error = %e, "failed to find post");
                ActionResult::failure("Failed to find the post. Please try again.")
            }
        })
    }

    pub async fn like_post(&self, user_id: &UserId, target: &PostTarget) -> ActionResult {
        let post = match self.resolve(user_id, target).await {
            Ok(post) => post,
            Err(result) => return result,
        };
        let author = &post.posted_by.username;

        if post.likes.contains(user_id) {
            return ActionResult::failure(format!(
                "You already liked @{}'s post: \"{}...\"",
                author,
                head(&post.text, 50)
            ));
        }

        match self.store.append_like(&post.id, user_id).await {
            Ok(updated) => ActionResult::success(
                format!("Liked @{}'s post: \"{}...\"", author, head(&post.text, 50)),
                ActionPayload::PostUpdated {
                    post: PostBrief {
                        id: updated.id.clone(),
                        author: author.clone(),
                        text: head(&updated.text, 100),
                        likes: Some(updated.likes.len()),
                        replies: None,
                    },
                },
            ),
            Err(e) => {
                tracing::error!(
                    user_id = %user_id,
                    post_id = %post.id,
                    error = %e,
                    "failed to like post"
                );
                ActionResult::failure("Failed to like post. Please try again.")
            }
        }
    }

    pub async fn reply_to_post(
        &self,
        user_id: &UserId,
        target: &PostTarget,
        text: &str,
    ) -> ActionResult {
        let post = match self.resolve(user_id, target).await {
            Ok(post) => post,
            Err(result) => return result,
        };

        match self.append_reply(user_id, &post, text).await {
            Ok(updated) => ActionResult::success(
                format!("Replied to @{}'s post: \"{}\"", post.posted_by.username, text),
                ActionPayload::PostUpdated {
                    post: PostBrief {
                        id: updated.id.clone(),
                        author: post.posted_by.username.clone(),
                        text: head(&updated.text, 100),
                        likes: None,
                        replies: Some(updated.replies.len()),
                    },
                },
            ),
            Err(e) => {
                tracing::error!(
                    user_id = %user_id,
                    post_id = %post.id,
                    error = %e,
                    "failed to reply to post"
                );
                ActionResult::failure("Failed to add reply. Please try again.")
            }
        }
    }

    async fn append_reply(
        &self,
        user_id: &UserId,
        post: &Post,
        text: &str,
    ) -> Result<Post, StoreError> {
        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))?;
        let reply = Reply {
            user_id: user_id.clone(),
            text: text.to_string(),
            user_profile_pic: user.profile_pic,
            username: user.username,
        };
        self.store.append_reply(&post.id, reply).await
    }

    pub async fn send_message(&self, sender: &UserId, username: &str, text: &str) -> ActionResult {
        let recipient = match self.store.get_user_by_username(username).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                return ActionResult::failure(format!(
                    "User \"{}\" not found. Please check the username and try again.",
                    username
                ))
            }
            Err(e) => {
                tracing::error!(sender = %sender, error = %e, "failed to look up recipient");
                return ActionResult::failure("Failed to send message. Please try again.");
            }
        };

        match self.deliver(sender, &recipient.id, text).await {
            Ok(conversation) => ActionResult::success(
                format!("Message sent to {} successfully! 💬", username),
                ActionPayload::MessageSent {
                    conversation,
                    recipient,
                },
            ),
            Err(e) => {
                tracing::error!(
                    sender = %sender,
                    recipient = %recipient.id,
                    error = %e,
                    "failed to send message"
                );
                ActionResult::failure("Failed to send message. Please try again.")
            }
        }
    }

    async fn deliver(
        &self,
        sender: &UserId,
        recipient: &UserId,
        text: &str,
    ) -> Result<ConversationId, StoreError> {
        let last_message = LastMessage {
            text: text.to_string(),
            sender: sender.clone(),
        };
        let conversation = self
            .store
            .get_or_create_conversation(&[sender.clone(), recipient.clone()], &last_message)
            .await?;

        // No ordering between the two writes; both finish before we return.
        let (message, updated) = tokio::join!(
            self.store.create_message(&conversation.id, sender, text),
            self.store
                .update_conversation_last_message(&conversation.id, last_message.clone()),
        );
        let message = message?;
        updated?;

        let payload = serde_json::to_value(&message).unwrap_or(Value::Null);
        if !self.notifier.notify(recipient, "newMessage", payload).await {
            tracing::debug!(recipient = %recipient, "recipient offline; realtime push skipped");
        }

        Ok(conversation.id)
    }

    pub async fn find_user(&self, query: &str) -> ActionResult {
        let directory = match self.store.list_all_users().await {
            Ok(users) => users,
            Err(e) => {
                tracing::error!(query = %query, error = %e, "failed to search users");
                return ActionResult::failure("Failed to search for users. Please try again.");
            }
        };

        let matcher = &self.config.matcher;
        let result = find_users_with(query, &directory, matcher);
        let (Some(best), Some(confidence)) = (result.best_match(), result.confidence) else {
            return ActionResult::failure(format!(
                "No users found similar to \"{}\". Try checking the spelling or using a different search term.",
                query
            ))
            .with_payload(ActionPayload::Suggestions {
                suggestions: NO_USER_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            });
        };

        let username = &best.user.username;
        let mut message = match confidence {
            ConfidenceLabel::Perfect => format!("Perfect match found: @{}", username),
            ConfidenceLabel::High => {
                format!("Found strong match: @{} ({}% similarity)", username, best.percent)
            }
            ConfidenceLabel::Medium => {
                format!("Found likely match: @{} ({}% similarity)", username, best.percent)
            }
            ConfidenceLabel::Low => format!(
                "Found possible matches for \"{}\". Best guess: @{} ({}% similarity)",
                query, username, best.percent
            ),
        };
        let total = result.matches.len();
        if total > 1 {
            let plural = if total > 2 { "s" } else { "" };
            message.push_str(&format!(" and {} other{}", total - 1, plural));
        }

        let suggestion = (best.percent < matcher.high_percent())
            .then(|| format!("Did you mean \"@{}\"?", username));
        let best_match = BestMatch {
            candidate: best.clone(),
            suggestion,
        };

        ActionResult::success(
            message,
            ActionPayload::Users(UserSearch {
                users: result.matches.clone(),
                confidence,
                search_term: query.to_string(),
                best_match,
                total_found: total,
            }),
        )
    }
}
