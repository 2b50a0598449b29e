use command_core::{find_users, similarity, MatchTier, UserSummary};
use proptest::prelude::*;

proptest! {
    #[test]
    fn identical_strings_score_one(s in "[a-z0-9 _]{1,24}") {
        prop_assert_eq!(similarity(&s, &s), 1.0);
    }

    #[test]
    fn symmetric(a in "[a-zA-Z0-9_]{0,16}", b in "[a-zA-Z0-9_]{0,16}") {
        let ab = similarity(&a, &b);
        let ba = similarity(&b, &a);
        prop_assert!((ab - ba).abs() < 1e-12, "{} vs {}", ab, ba);
    }

    #[test]
    fn bounded(a in ".{0,20}", b in ".{0,20}") {
        let score = similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
    }

    #[test]
    fn nothing_below_threshold_is_returned(
        query in "[a-z]{1,8}",
        names in proptest::collection::vec("[a-z]{1,10}", 0..20),
    ) {
        let directory: Vec<UserSummary> = names
            .iter()
            .enumerate()
            .map(|(i, name)| UserSummary::new(format!("u{i}").as_str(), name.clone()))
            .collect();
        let result = find_users(&query, &directory);
        prop_assert!(result.matches.len() <= 8);
        for candidate in &result.matches {
            prop_assert!(candidate.score >= 0.55);
        }
    }

    #[test]
    fn exact_hit_returns_only_exact(
        query in "[a-z]{3,8}",
        others in proptest::collection::vec("[a-z]{3,10}", 0..10),
    ) {
        let mut directory: Vec<UserSummary> = others
            .iter()
            .enumerate()
            .map(|(i, name)| UserSummary::new(format!("u{i}").as_str(), name.clone()))
            .collect();
        directory.push(UserSummary::new("target", query.to_uppercase()));
        let result = find_users(&query, &directory);
        prop_assert!(!result.matches.is_empty());
        for candidate in &result.matches {
            prop_assert_eq!(candidate.tier, MatchTier::Exact);
            prop_assert_eq!(candidate.score, 1.0);
            prop_assert_eq!(candidate.user.username.to_lowercase(), query.clone());
        }
    }

    #[test]
    fn ranking_is_deterministic(
        query in "[a-z]{1,6}",
        names in proptest::collection::vec("[a-z]{1,8}", 0..15),
    ) {
        let directory: Vec<UserSummary> = names
            .iter()
            .enumerate()
            .map(|(i, name)| UserSummary::new(format!("u{i}").as_str(), name.clone()))
            .collect();
        prop_assert_eq!(find_users(&query, &directory), find_users(&query, &directory));
    }
}

#[test]
fn containment_example() {
    let expected = (2.0 / 18.0) * 0.95;
    assert!((similarity("ai", "exploring ai today") - expected).abs() < 1e-12);
}

#[test]
fn typo_tolerance_example() {
    assert!(similarity("jon", "john") > similarity("jon", "xyz"));
    assert!(similarity("jon", "john") >= 0.55);
}
