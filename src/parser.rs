//! Intent parsing from the generative backend's reply

use regex::Regex;
use serde_json::{Map, Value};

use crate::types::{ActionKind, Intent};

/// Message used when the backend reply is unusable and empty.
pub const DEFAULT_REPLY: &str =
    "I'm here to help! Try asking me to create a post or read your feed.";

/// Confidence assigned to fallback chat intents.
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Turns untrusted backend text into an [`Intent`].
///
/// Never fails: anything that is not a JSON object with a non-empty string
/// `action` becomes a chat intent echoing the reply.
pub struct IntentParser {
    fence: Regex,
}

impl IntentParser {
    pub fn new() -> Self {
        // Compiled once; the pattern is a constant and cannot fail
        let fence = Regex::new(r"```(?:json)?\n?").expect("Invalid regex pattern");
        Self { fence }
    }

    /// Remove code-fence markers the backend wraps JSON in, then trim.
    pub fn strip_fences(&self, raw: &str) -> String {
        self.fence.replace_all(raw, "").trim().to_string()
    }

    pub fn parse(&self, raw: &str) -> Intent {
        let text = self.strip_fences(raw);

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(fields)) => match intent_from_fields(&fields) {
                Some(intent) => intent,
                None => {
                    tracing::warn!(
                        reply = %text,
                        "backend reply has no action; falling back to chat"
                    );
                    fallback(text)
                }
            },
            Ok(_) | Err(_) => {
                tracing::warn!(reply = %text, "failed to parse backend reply as JSON");
                fallback(text)
            }
        }
    }
}

impl Default for IntentParser {
    fn default() -> Self {
        Self::new()
    }
}

fn fallback(text: String) -> Intent {
    let message = if text.is_empty() {
        DEFAULT_REPLY.to_string()
    } else {
        text
    };
    Intent::chat(message, FALLBACK_CONFIDENCE)
}

fn intent_from_fields(fields: &Map<String, Value>) -> Option<Intent> {
    let action = text_field(fields, &["action"])?;

    let confidence = fields
        .get("confidence")
        .and_then(Value::as_f64)
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(FALLBACK_CONFIDENCE);

    Some(Intent {
        action: ActionKind::from_label(&action),
        content: text_field(fields, &["content"]),
        message: text_field(fields, &["message"]).unwrap_or_else(|| DEFAULT_REPLY.to_string()),
        post_description: text_field(fields, &["postDescription", "post_description"]),
        author_username: text_field(fields, &["authorUsername", "author_username"]),
        username: text_field(fields, &["username"]),
        confidence,
    })
}

/// First non-empty string among `keys`. Wrong types count as absent.
fn text_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .filter_map(Value::as_str)
        .find(|s| !s.trim().is_empty())
        .map(str::to_string)
}
