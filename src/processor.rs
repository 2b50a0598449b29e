//! Command processor - the one entry point callers use
//!
//! Builds the backend prompt, sends it, parses the reply and dispatches the
//! resulting intent. Only backend failures (and an unknown requesting user)
//! fail the call; everything else comes back inside [`CommandResponse`].
//!
//! There is no timeout or cancellation here. Callers wrap
//! [`CommandProcessor::process_command`] in their own timeout; an abandoned
//! call is not rolled back, so a retry after a timeout may run an action twice.

use std::sync::Arc;

use tracing::instrument;

use crate::config::CommandConfig;
use crate::dispatcher::ActionDispatcher;
use crate::error::CommandError;
use crate::parser::IntentParser;
use crate::prompt::build_prompt;
use crate::store::{NoopNotifier, RealtimeNotifier, SocialStore, TextGenerator};
use crate::types::{CommandResponse, UserId};

pub struct CommandProcessor {
    store: Arc<dyn SocialStore>,
    generator: Arc<dyn TextGenerator>,
    parser: IntentParser,
    dispatcher: ActionDispatcher,
    app_name: String,
}

impl CommandProcessor {
    pub fn new(
        store: Arc<dyn SocialStore>,
        generator: Arc<dyn TextGenerator>,
        notifier: Arc<dyn RealtimeNotifier>,
        config: CommandConfig,
    ) -> Self {
        let app_name = config.assistant.app_name.clone();
        Self {
            dispatcher: ActionDispatcher::new(store.clone(), notifier, config),
            store,
            generator,
            parser: IntentParser::new(),
            app_name,
        }
    }

    /// Default config and no realtime delivery.
    pub fn with_defaults(store: Arc<dyn SocialStore>, generator: Arc<dyn TextGenerator>) -> Self {
        Self::new(
            store,
            generator,
            Arc::new(NoopNotifier),
            CommandConfig::default(),
        )
    }

    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn process_command(
        &self,
        user_id: &UserId,
        prompt: &str,
    ) -> Result<CommandResponse, CommandError> {
        let user = self
            .store
            .get_user_by_id(user_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to load requesting user");
                CommandError::Upstream(e.to_string())
            })?
            .ok_or_else(|| CommandError::UserNotFound(user_id.to_string()))?;

        let instruction = build_prompt(&self.app_name, &user, prompt);
        let raw = self
            .generator
            .generate_text(&instruction)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "text generation failed");
                CommandError::from(e)
            })?;

        let intent = self.parser.parse(&raw);
        tracing::debug!(action = %intent.action, confidence = intent.confidence, "intent parsed");

        let action_result = self.dispatcher.dispatch(user_id, &intent).await;

        Ok(CommandResponse {
            ai_message: intent.message,
            action: intent.action,
            action_result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::store::InMemorySocialStore;
    use crate::types::{ActionKind, UserSummary};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedGenerator {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().expect("lock").push(prompt.to_string());
            self.reply.clone().map_err(GenerationError::classify)
        }
    }

    fn store() -> Arc<InMemorySocialStore> {
        let store = InMemorySocialStore::new();
        store
            .add_user(UserSummary::new("me", "maya").with_bio("climber"))
            .unwrap();
        store.add_user(UserSummary::new("alex", "alex")).unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_plain_text_reply_is_chat() {
        let generator = ScriptedGenerator::replying("Hello, happy to help!");
        let processor = CommandProcessor::with_defaults(store(), generator.clone());
        let response = processor
            .process_command(&UserId::new("me"), "hi there")
            .await
            .unwrap();
        assert_eq!(response.action, ActionKind::Chat);
        assert_eq!(response.ai_message, "Hello, happy to help!");
        assert_eq!(response.action_result, None);

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("User Request: \"hi there\""));
        assert!(prompts[0].contains("- Bio: climber"));
    }

    #[tokio::test]
    async fn test_find_user_flow() {
        let generator = ScriptedGenerator::replying(
            r#"{"action": "find_user", "username": "alex", "message": "Looking for alex!", "confidence": 0.85}"#,
        );
        let processor = CommandProcessor::with_defaults(store(), generator);
        let response = processor
            .process_command(&UserId::new("me"), "find alex")
            .await
            .unwrap();
        assert_eq!(response.action, ActionKind::FindUser);
        assert_eq!(response.ai_message, "Looking for alex!");
        let result = response.action_result.unwrap();
        assert!(result.success);
        assert_eq!(result.message, "Perfect match found: @alex");
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let processor =
            CommandProcessor::with_defaults(store(), ScriptedGenerator::replying("{}"));
        let err = processor
            .process_command(&UserId::new("ghost"), "hi")
            .await
            .unwrap_err();
        assert_eq!(err.reason_code(), "user-not-found");
    }

    #[tokio::test]
    async fn test_generation_failures_are_classified() {
        let processor = CommandProcessor::with_defaults(
            store(),
            ScriptedGenerator::failing(
                "[400 Bad Request] API key not valid. Please pass a valid API key.",
            ),
        );
        let err = processor
            .process_command(&UserId::new("me"), "hi")
            .await
            .unwrap_err();
        assert_eq!(err.reason_code(), "auth-config-error");

        let generator = ScriptedGenerator::failing("connection reset");
        let processor = CommandProcessor::with_defaults(store(), generator);
        let err = processor
            .process_command(&UserId::new("me"), "hi")
            .await
            .unwrap_err();
        assert_eq!(err.reason_code(), "generic-upstream-error");
    }
}
