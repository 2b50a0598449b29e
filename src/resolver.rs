//! Post resolver - picks the post a vague reference ("john's post about AI") means

use thiserror::Error;

use crate::error::StoreError;
use crate::store::{PostFilter, SocialStore};
use crate::types::{Post, UserId};

/// Most recent posts considered per resolution.
pub const CANDIDATE_WINDOW: usize = 20;

const PHRASE_SCORE: u32 = 100;
const WORD_SCORE: u32 = 10;

/// Why no post could be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundReason {
    #[error("User \"@{0}\" not found. Please check the username.")]
    AuthorNotFound(String),

    #[error("{}", no_candidates_message(.author))]
    NoCandidates { author: Option<String> },

    #[error("{}", no_relevance_message(.description, .author))]
    NoRelevanceMatch {
        description: String,
        author: Option<String>,
    },
}

fn no_candidates_message(author: &Option<String>) -> String {
    match author {
        Some(author) => format!("No posts found from @{}", author),
        None => "No posts found in your feed to interact with.".to_string(),
    }
}

fn no_relevance_message(description: &str, author: &Option<String>) -> String {
    let scope = match author {
        Some(author) => format!(" by @{}", author),
        None => " in your feed".to_string(),
    };
    format!("No posts found matching \"{}\"{}.", description, scope)
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    NotFound(#[from] NotFoundReason),

    #[error("store error while resolving post: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of scoring a candidate set without any store access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Found(usize),
    NoCandidates,
    NoRelevanceMatch,
}

/// Relevance of `post_text` to `description`.
///
/// +100 when the whole description appears in the text, plus +10 for every
/// (description word, post word) pair where either contains the other.
/// Case-insensitive; duplicate words count each time.
pub fn relevance_score(post_text: &str, description: &str) -> u32 {
    let text = post_text.to_lowercase();
    let term = description.to_lowercase();

    let mut score = 0;
    if text.contains(term.as_str()) {
        score += PHRASE_SCORE;
    }

    let post_words: Vec<&str> = text.split_whitespace().collect();
    for search_word in term.split_whitespace() {
        for post_word in &post_words {
            if post_word.contains(search_word) || search_word.contains(post_word) {
                score += WORD_SCORE;
            }
        }
    }
    score
}

/// Pick from candidates already ordered newest first.
///
/// Without a description the newest post wins. With one, the highest relevance
/// wins and ties go to the newer post; a best score of zero is a miss.
pub fn select_post(candidates: &[Post], description: Option<&str>) -> Selection {
    if candidates.is_empty() {
        return Selection::NoCandidates;
    }

    let description = match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => d,
        None => return Selection::Found(0),
    };

    let mut best: Option<(usize, u32)> = None;
    for (index, post) in candidates.iter().enumerate() {
        let score = relevance_score(&post.text, description);
        tracing::debug!(post_id = %post.id, score, "scored post candidate");
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((index, score));
        }
    }

    match best {
        Some((index, score)) if score > 0 => Selection::Found(index),
        _ => Selection::NoRelevanceMatch,
    }
}

/// Resolve a post reference for `requester`.
///
/// Candidates are the requester's own posts and those of accounts they follow,
/// or, when `author_username` is given, only that author's posts.
pub async fn find_post(
    store: &dyn SocialStore,
    requester: &UserId,
    description: Option<&str>,
    author_username: Option<&str>,
    window: usize,
) -> Result<Post, ResolveError> {
    let filter = match author_username {
        Some(username) => {
            let author = store
                .get_user_by_username(username)
                .await?
                .ok_or_else(|| NotFoundReason::AuthorNotFound(username.to_string()))?;
            PostFilter::AuthorEq(author.id)
        }
        None => {
            let mut authors = store.list_following(requester).await?;
            authors.push(requester.clone());
            PostFilter::AuthorIn(authors)
        }
    };

    let mut candidates = store.list_posts(&filter, window).await?;

    match select_post(&candidates, description) {
        Selection::Found(index) => Ok(candidates.swap_remove(index)),
        Selection::NoCandidates => Err(NotFoundReason::NoCandidates {
            author: author_username.map(str::to_string),
        }
        .into()),
        Selection::NoRelevanceMatch => Err(NotFoundReason::NoRelevanceMatch {
            description: description.unwrap_or_default().to_string(),
            author: author_username.map(str::to_string),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemorySocialStore;
    use crate::types::{PostId, UserSummary};
    use chrono::{Duration, Utc};

    fn post(text: &str, author: &str, minutes_ago: i64) -> Post {
        Post {
            id: PostId::generate(),
            posted_by: UserSummary::new(author, author),
            text: text.to_string(),
            likes: Vec::new(),
            replies: Vec::new(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn test_phrase_match_beats_unrelated() {
        let candidates = vec![post("I love AI research", "john", 1), post("lunch today", "amy", 2)];
        assert_eq!(relevance_score("I love AI research", "AI"), 120);
        assert_eq!(relevance_score("lunch today", "AI"), 0);
        assert_eq!(select_post(&candidates, Some("AI")), Selection::Found(0));
    }

    #[test]
    fn test_word_pairs_count_each_time() {
        // "ai" is contained in "ai", "said" and "again"
        assert_eq!(relevance_score("ai said again", "ai"), 130);
        // no full phrase, but "cats" ⊃ "cat" and "dogs" ⊃ "dog"
        assert_eq!(relevance_score("cats and dogs", "dog cat"), 20);
    }

    #[test]
    fn test_no_description_picks_newest() {
        let candidates = vec![post("newest", "a", 1), post("older", "a", 5)];
        assert_eq!(select_post(&candidates, None), Selection::Found(0));
        assert_eq!(select_post(&candidates, Some("   ")), Selection::Found(0));
    }

    #[test]
    fn test_ties_keep_recency_order() {
        let candidates = vec![
            post("rust is fun", "a", 1),
            post("rust is fun too", "b", 2),
        ];
        // both contain "rust": 100 + 10
        assert_eq!(select_post(&candidates, Some("rust")), Selection::Found(0));
    }

    #[test]
    fn test_zero_score_is_miss() {
        let candidates = vec![post("lunch today", "a", 1)];
        assert_eq!(
            select_post(&candidates, Some("quantum")),
            Selection::NoRelevanceMatch
        );
        assert_eq!(select_post(&[], Some("quantum")), Selection::NoCandidates);
    }

    #[test]
    fn test_not_found_messages() {
        let reason = NotFoundReason::NoRelevanceMatch {
            description: "AI".to_string(),
            author: Some("john".to_string()),
        };
        assert_eq!(reason.to_string(), "No posts found matching \"AI\" by @john.");
        let reason = NotFoundReason::NoCandidates { author: None };
        assert_eq!(
            reason.to_string(),
            "No posts found in your feed to interact with."
        );
    }

    fn seeded_store() -> InMemorySocialStore {
        let store = InMemorySocialStore::new();
        for (id, name) in [("me", "me"), ("john", "john"), ("sarah", "sarah"), ("zed", "zed")] {
            store.add_user(UserSummary::new(id, name)).unwrap();
        }
        store.follow(&UserId::new("me"), &UserId::new("john")).unwrap();
        let now = Utc::now();
        store
            .insert_post(&UserId::new("john"), "I love AI research", now - Duration::minutes(10))
            .unwrap();
        store
            .insert_post(&UserId::new("me"), "lunch today", now - Duration::minutes(5))
            .unwrap();
        store
            .insert_post(&UserId::new("zed"), "AI everywhere", now)
            .unwrap();
        store
            .insert_post(&UserId::new("sarah"), "weekend hike", now)
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_feed_scope_excludes_unfollowed() {
        let store = seeded_store();
        let found = find_post(&store, &UserId::new("me"), Some("AI"), None, CANDIDATE_WINDOW)
            .await
            .unwrap();
        assert_eq!(found.text, "I love AI research");

        let newest = find_post(&store, &UserId::new("me"), None, None, CANDIDATE_WINDOW)
            .await
            .unwrap();
        assert_eq!(newest.text, "lunch today");
    }

    #[tokio::test]
    async fn test_author_filter_reaches_unfollowed_author() {
        let store = seeded_store();
        let found = find_post(&store, &UserId::new("me"), None, Some("ZED"), CANDIDATE_WINDOW)
            .await
            .unwrap();
        assert_eq!(found.text, "AI everywhere");
    }

    #[tokio::test]
    async fn test_unknown_author() {
        let store = seeded_store();
        let err = find_post(&store, &UserId::new("me"), Some("AI"), Some("ghost"), CANDIDATE_WINDOW)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::NotFound(NotFoundReason::AuthorNotFound(ref name)) if name == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_only_recent_window_is_scored() {
        let store = InMemorySocialStore::new();
        store.add_user(UserSummary::new("me", "me")).unwrap();
        store.add_user(UserSummary::new("john", "john")).unwrap();
        store.follow(&UserId::new("me"), &UserId::new("john")).unwrap();
        let now = Utc::now();
        store
            .insert_post(
                &UserId::new("john"),
                "quantum computing notes",
                now - Duration::minutes(CANDIDATE_WINDOW as i64 + 1),
            )
            .unwrap();
        for i in 0..CANDIDATE_WINDOW {
            store
                .insert_post(
                    &UserId::new("john"),
                    "lunch today",
                    now - Duration::minutes(i as i64),
                )
                .unwrap();
        }

        let me = UserId::new("me");
        let err = find_post(&store, &me, Some("quantum"), None, CANDIDATE_WINDOW)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::NotFound(NotFoundReason::NoRelevanceMatch { .. })
        ));

        let found = find_post(&store, &me, Some("quantum"), None, CANDIDATE_WINDOW + 1)
            .await
            .unwrap();
        assert_eq!(found.text, "quantum computing notes");
    }

    #[tokio::test]
    async fn test_author_without_posts() {
        let store = seeded_store();
        store.add_user(UserSummary::new("quiet", "quiet")).unwrap();
        let err = find_post(&store, &UserId::new("me"), None, Some("quiet"), CANDIDATE_WINDOW)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No posts found from @quiet");
    }
}
