//! Error types for the store, generator and command boundaries

use thiserror::Error;

/// Failures reported by a [`SocialStore`](crate::store::SocialStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures reported by a [`TextGenerator`](crate::store::TextGenerator).
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid API key: {0}")]
    InvalidApiKey(String),

    #[error("generator not configured: {0}")]
    NotConfigured(String),

    #[error("upstream generation failed: {0}")]
    Upstream(String),
}

impl GenerationError {
    /// Sort a raw backend error message into auth vs generic failures.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("API_KEY_INVALID") {
            Self::InvalidApiKey(message)
        } else if message.contains("API key not valid") {
            Self::NotConfigured(message)
        } else {
            Self::Upstream(message)
        }
    }
}

/// Failures that abort a whole command.
///
/// Everything else (bad backend JSON, missing fields, unknown entities, store
/// write failures) is folded into the response instead.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("generator authentication failed ({details}): {source}")]
    AuthConfig {
        details: &'static str,
        #[source]
        source: GenerationError,
    },

    #[error("failed to process command: {0}")]
    Upstream(String),
}

impl CommandError {
    /// Stable code for the caller to branch on.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "user-not-found",
            Self::AuthConfig { .. } => "auth-config-error",
            Self::Upstream(_) => "generic-upstream-error",
        }
    }

    /// Render-ready message for the end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "User not found",
            Self::AuthConfig {
                source: GenerationError::InvalidApiKey(_),
                ..
            } => "The AI service cannot authenticate. Please contact support.",
            Self::AuthConfig { .. } => {
                "The AI service is not properly configured. Please contact support."
            }
            Self::Upstream(_) => {
                "Something went wrong while processing your request. Please try again."
            }
        }
    }
}

impl From<GenerationError> for CommandError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::InvalidApiKey(_) => Self::AuthConfig {
                details: "API_KEY_INVALID",
                source: err,
            },
            GenerationError::NotConfigured(_) => Self::AuthConfig {
                details: "INVALID_API_KEY",
                source: err,
            },
            GenerationError::Upstream(message) => Self::Upstream(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_api_key_messages() {
        assert!(matches!(
            GenerationError::classify("[400] API_KEY_INVALID"),
            GenerationError::InvalidApiKey(_)
        ));
        assert!(matches!(
            GenerationError::classify("API key not valid. Please pass a valid API key."),
            GenerationError::NotConfigured(_)
        ));
        assert!(matches!(
            GenerationError::classify("socket hang up"),
            GenerationError::Upstream(_)
        ));
    }

    #[test]
    fn test_reason_codes() {
        let auth: CommandError = GenerationError::classify("API_KEY_INVALID").into();
        assert_eq!(auth.reason_code(), "auth-config-error");
        assert!(auth.to_string().contains("API_KEY_INVALID"));

        let other: CommandError = GenerationError::Upstream("timeout".into()).into();
        assert_eq!(other.reason_code(), "generic-upstream-error");
        assert!(other.user_message().contains("try again"));
    }

    #[test]
    fn test_auth_messages_differ_by_cause() {
        let invalid: CommandError = GenerationError::InvalidApiKey("x".into()).into();
        let missing: CommandError = GenerationError::NotConfigured("x".into()).into();
        assert_ne!(invalid.user_message(), missing.user_message());
    }
}
