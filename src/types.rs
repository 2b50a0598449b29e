//! Core data types: intents, social-graph projections, match candidates and results

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Fresh random identifier.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

string_id!(
    /// Strongly-typed user ID.
    UserId
);
string_id!(
    /// Strongly-typed post ID.
    PostId
);
string_id!(
    /// Strongly-typed conversation ID.
    ConversationId
);
string_id!(
    /// Strongly-typed message ID.
    MessageId
);

/// The seven things a request can turn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Post,
    Read,
    Chat,
    Like,
    Reply,
    Message,
    FindUser,
}

impl ActionKind {
    /// Map a backend action label to a kind. Anything unrecognised is chat.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "post" => Self::Post,
            "read" => Self::Read,
            "like" => Self::Like,
            "reply" => Self::Reply,
            "message" => Self::Message,
            "find_user" => Self::FindUser,
            _ => Self::Chat,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Read => "read",
            Self::Chat => "chat",
            Self::Like => "like",
            Self::Reply => "reply",
            Self::Message => "message",
            Self::FindUser => "find_user",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated interpretation of one request.
///
/// Optional fields are `None` when the backend omitted them or sent an empty
/// string. Which of them are required depends on `action`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub action: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub confidence: f64,
}

impl Intent {
    /// Plain chat intent carrying only a message.
    pub fn chat(message: impl Into<String>, confidence: f64) -> Self {
        Self {
            action: ActionKind::Chat,
            content: None,
            message: message.into(),
            post_description: None,
            author_username: None,
            username: None,
            confidence,
        }
    }
}

/// Read-only projection of a user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_pic: String,
}

impl UserSummary {
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            name: None,
            bio: String::new(),
            profile_pic: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }
}

/// A reply attached to a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub user_id: UserId,
    pub text: String,
    pub user_profile_pic: String,
    pub username: String,
}

/// A post with its author populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: PostId,
    pub posted_by: UserSummary,
    pub text: String,
    #[serde(default)]
    pub likes: Vec<UserId>,
    #[serde(default)]
    pub replies: Vec<Reply>,
    pub created_at: DateTime<Utc>,
}

/// Most recent message shown on a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastMessage {
    pub text: String,
    pub sender: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(rename = "_id")]
    pub id: ConversationId,
    pub participants: Vec<UserId>,
    pub last_message: Option<LastMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Coarse match quality bucket. Higher rank sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Partial,
    Fuzzy,
}

impl MatchTier {
    pub fn rank(&self) -> u8 {
        match self {
            Self::Exact => 3,
            Self::Partial => 2,
            Self::Fuzzy => 1,
        }
    }
}

/// Which user field produced a candidate's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedField {
    Username,
    Name,
}

/// A ranked user from a directory search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    #[serde(flatten)]
    pub user: UserSummary,
    #[serde(rename = "matchType")]
    pub tier: MatchTier,
    /// Similarity in `0.0..=1.0`.
    #[serde(rename = "similarity")]
    pub score: f64,
    /// `score` as a rounded percentage.
    #[serde(rename = "score")]
    pub percent: u32,
    pub matched_field: MatchedField,
}

impl MatchCandidate {
    pub fn new(
        user: UserSummary,
        tier: MatchTier,
        score: f64,
        matched_field: MatchedField,
    ) -> Self {
        Self {
            user,
            tier,
            score,
            percent: (score * 100.0).round() as u32,
            matched_field,
        }
    }
}

/// Human-facing bucket derived from the top match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLabel {
    Perfect,
    High,
    Medium,
    Low,
}

impl ConfidenceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Perfect => "perfect",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Short view of a post echoed back after a like or reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostBrief {
    #[serde(rename = "_id")]
    pub id: PostId,
    pub author: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies: Option<usize>,
}

/// One feed line as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: PostId,
    pub author: String,
    pub text: String,
    pub likes: usize,
    pub replies: usize,
    pub time_ago: String,
}

/// Best match plus a "did you mean" hint when it is not a strong match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestMatch {
    #[serde(flatten)]
    pub candidate: MatchCandidate,
    pub suggestion: Option<String>,
}

/// Payload of a successful user search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearch {
    pub users: Vec<MatchCandidate>,
    pub confidence: ConfidenceLabel,
    pub search_term: String,
    pub best_match: BestMatch,
    pub total_found: usize,
}

/// Action-specific data carried alongside `success` and `message`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionPayload {
    CreatedPost {
        post: Post,
    },
    Feed {
        posts: Vec<Post>,
        summaries: Vec<PostSummary>,
    },
    PostUpdated {
        post: PostBrief,
    },
    MessageSent {
        conversation: ConversationId,
        recipient: UserSummary,
    },
    Users(UserSearch),
    Suggestions {
        suggestions: Vec<String>,
    },
}

/// Uniform outcome of every action executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub payload: Option<ActionPayload>,
}

impl ActionResult {
    pub fn success(message: impl Into<String>, payload: ActionPayload) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload: Some(payload),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: ActionPayload) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// What the boundary operation hands back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    #[serde(rename = "aiResponse")]
    pub ai_message: String,
    pub action: ActionKind,
    pub action_result: Option<ActionResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_label_is_chat() {
        assert_eq!(ActionKind::from_label("dance"), ActionKind::Chat);
        assert_eq!(ActionKind::from_label(" FIND_USER "), ActionKind::FindUser);
        assert_eq!(ActionKind::from_label("reply"), ActionKind::Reply);
    }

    #[test]
    fn test_tier_rank_order() {
        assert!(MatchTier::Exact.rank() > MatchTier::Partial.rank());
        assert!(MatchTier::Partial.rank() > MatchTier::Fuzzy.rank());
    }

    #[test]
    fn test_candidate_percent_rounds() {
        let c = MatchCandidate::new(
            UserSummary::new("u1", "john"),
            MatchTier::Fuzzy,
            0.846,
            MatchedField::Username,
        );
        assert_eq!(c.percent, 85);
    }

    #[test]
    fn test_action_result_flattens_payload() {
        let result = ActionResult::success(
            "ok",
            ActionPayload::Suggestions {
                suggestions: vec!["a".to_string()],
            },
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["suggestions"][0], "a");

        let json = serde_json::to_value(ActionResult::failure("nope")).unwrap();
        assert_eq!(json["message"], "nope");
        assert!(json.get("suggestions").is_none());
    }

    #[test]
    fn test_response_uses_wire_names() {
        let response = CommandResponse {
            ai_message: "hi".to_string(),
            action: ActionKind::FindUser,
            action_result: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["aiResponse"], "hi");
        assert_eq!(json["action"], "find_user");
        assert!(json["actionResult"].is_null());
    }
}
