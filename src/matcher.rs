//! User matcher - ranks a user directory against a free-text name reference

use crate::config::MatcherConfig;
use crate::similarity::similarity;
use crate::types::{ConfidenceLabel, MatchCandidate, MatchTier, MatchedField, UserSummary};

/// Candidates below this similarity are dropped.
pub const MATCH_THRESHOLD: f64 = 0.55;
/// Result list cap.
pub const MAX_RESULTS: usize = 8;
/// Top score needed for a "high" label.
pub const HIGH_CONFIDENCE: f64 = 0.85;
/// Top score needed for a "medium" label.
pub const MEDIUM_CONFIDENCE: f64 = 0.70;

/// Ranked outcome of a directory search.
#[derive(Debug, Clone, PartialEq)]
pub struct UserMatchResult {
    pub matches: Vec<MatchCandidate>,
    pub confidence: Option<ConfidenceLabel>,
}

impl UserMatchResult {
    pub fn best_match(&self) -> Option<&MatchCandidate> {
        self.matches.first()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Match `query` against `directory` with default thresholds.
pub fn find_users(query: &str, directory: &[UserSummary]) -> UserMatchResult {
    find_users_with(query, directory, &MatcherConfig::default())
}

/// Match `query` against `directory`.
///
/// A case-insensitive exact username hit short-circuits everything else: only
/// the exact hits are returned. Otherwise every user is scored on the better of
/// username and display-name similarity, tagged `partial` when either field
/// contains the query, filtered by threshold, then ordered by tier and score.
pub fn find_users_with(
    query: &str,
    directory: &[UserSummary],
    config: &MatcherConfig,
) -> UserMatchResult {
    let search_term = query.trim().to_lowercase();

    let exact: Vec<MatchCandidate> = directory
        .iter()
        .filter(|user| user.username.to_lowercase() == search_term)
        .map(|user| {
            MatchCandidate::new(user.clone(), MatchTier::Exact, 1.0, MatchedField::Username)
        })
        .collect();

    let mut matches = if !exact.is_empty() {
        exact
    } else {
        let mut scored: Vec<MatchCandidate> = directory
            .iter()
            .map(|user| score_user(&search_term, user))
            .filter(|candidate| candidate.score >= config.threshold)
            .collect();

        // Stable: equal tier and score keep directory order.
        scored.sort_by(|a, b| {
            b.tier
                .rank()
                .cmp(&a.tier.rank())
                .then_with(|| b.score.total_cmp(&a.score))
        });
        scored
    };

    matches.truncate(config.max_results);

    let confidence = matches
        .first()
        .map(|best| confidence_label(best, config));

    tracing::debug!(
        query = %search_term,
        directory = directory.len(),
        found = matches.len(),
        "user search ranked"
    );

    UserMatchResult {
        matches,
        confidence,
    }
}

fn score_user(search_term: &str, user: &UserSummary) -> MatchCandidate {
    let username = user.username.to_lowercase();
    let name = user
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .map(str::to_lowercase);

    let username_sim = similarity(search_term, &username);
    let name_sim = name
        .as_deref()
        .map(|n| similarity(search_term, n))
        .unwrap_or(0.0);

    let contains = username.contains(search_term)
        || name.as_deref().is_some_and(|n| n.contains(search_term));
    let tier = if contains {
        MatchTier::Partial
    } else {
        MatchTier::Fuzzy
    };

    let (score, field) = if username_sim > name_sim {
        (username_sim, MatchedField::Username)
    } else {
        (name_sim, MatchedField::Name)
    };

    MatchCandidate::new(user.clone(), tier, score, field)
}

/// Label derived from the top candidate's rounded percentage, so it always
/// agrees with the percentage shown to the user.
pub fn confidence_label(best: &MatchCandidate, config: &MatcherConfig) -> ConfidenceLabel {
    if best.tier == MatchTier::Exact {
        ConfidenceLabel::Perfect
    } else if best.percent >= config.high_percent() {
        ConfidenceLabel::High
    } else if best.percent >= config.medium_percent() {
        ConfidenceLabel::Medium
    } else {
        ConfidenceLabel::Low
    }
}
