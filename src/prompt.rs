//! Prompt sent to the generative backend

use crate::types::UserSummary;

const COMMANDS: &str = "\
1. POST - Create new posts
2. READ - Get recent feed posts
3. CHAT - General conversation
4. LIKE - Like posts by description or author
5. REPLY - Reply to posts by description or author
6. MESSAGE - Send message to other users
7. FIND_USER - Find users to chat with";

const REPLY_FORMAT: &str = r#"{
  "action": "post|read|chat|like|reply|message|find_user",
  "content": "text content for posts/replies/messages (only if creating post, reply, or message)",
  "message": "friendly response to user",
  "postDescription": "description of the post to like/reply to (for like/reply actions)",
  "authorUsername": "username of post author (for like/reply actions)",
  "username": "username if needed (for message/find_user actions)",
  "confidence": 0.8
}"#;

const EXAMPLES: &str = r#"- "Create a post about AI" → {"action": "post", "content": "Exploring the fascinating world of AI technology! #AI #Tech", "message": "I'll create an engaging post about AI for you!", "confidence": 0.9}
- "Show my feed" → {"action": "read", "message": "Let me fetch your latest posts!", "confidence": 0.95}
- "Hello there" → {"action": "chat", "message": "Hello! I'm here to help you with posting, reading your feed, or just chat. What would you like to do?", "confidence": 0.8}
- "Like the post about AI by john" → {"action": "like", "postDescription": "AI", "authorUsername": "john", "message": "I'll like john's post about AI!", "confidence": 0.85}
- "Reply to sarah's latest post: Great idea!" → {"action": "reply", "content": "Great idea!", "authorUsername": "sarah", "message": "I'll reply to sarah's latest post!", "confidence": 0.9}
- "Send message to john: Hello!" → {"action": "message", "content": "Hello!", "username": "john", "message": "I'll send your message to john!", "confidence": 0.9}
- "Find user alex" → {"action": "find_user", "username": "alex", "message": "I'll help you find and start a chat with alex!", "confidence": 0.85}"#;

/// Build the full instruction for one request from `user`.
pub fn build_prompt(app_name: &str, user: &UserSummary, request: &str) -> String {
    format!(
        "You are an AI assistant for a social media app called {app_name}. \
You help users interact with their social feed through natural language.

Available Commands:
{COMMANDS}

User Context:
- Username: {username}
- Name: {name}
- Bio: {bio}

CRITICAL: You MUST respond with ONLY a valid JSON object. Do not include any markdown formatting, code blocks, or extra text.

Required JSON format:
{REPLY_FORMAT}

Examples:
{EXAMPLES}

User Request: \"{request}\"

Respond with ONLY the JSON object, no other text:",
        username = user.username,
        name = user.name.as_deref().unwrap_or(""),
        bio = user.bio,
    )
}
