//! String similarity for fuzzy entity lookup
//!
//! Scores how close a user-typed reference ("jon", "sara k") is to a stored
//! name. Typo-aware: substitutions between characters people commonly mix up
//! cost less than unrelated substitutions.

/// Multiplier applied to containment matches so they never reach a perfect 1.0.
pub const CONTAINMENT_FACTOR: f64 = 0.95;

/// Substitution cost for a commonly confused character pair.
pub const TYPO_SUBSTITUTION_COST: f64 = 0.7;

const FIRST_CHAR_BONUS: f64 = 0.1;
const LENGTH_RATIO_BONUS: f64 = 0.1;

/// Calculate similarity score between two strings (0.0-1.0)
///
/// Stages, first hit wins:
/// 1. Identical after lowercase/trim → 1.0
/// 2. One contains the other → `shorter / longer * 0.95`
/// 3. Typo-weighted edit distance, plus first-character and length-ratio bonuses
///
/// Lengths are counted in characters, not bytes.
pub fn similarity(a: &str, b: &str) -> f64 {
    let s1 = a.trim().to_lowercase();
    let s2 = b.trim().to_lowercase();

    if s1 == s2 {
        return 1.0;
    }

    let len1 = s1.chars().count();
    let len2 = s2.chars().count();
    let longer = len1.max(len2) as f64;
    let shorter = len1.min(len2) as f64;

    // Also covers the empty-vs-nonempty case: shorter is 0 so the score is 0.
    if s1.contains(s2.as_str()) || s2.contains(s1.as_str()) {
        return (shorter / longer) * CONTAINMENT_FACTOR;
    }

    let distance = typo_weighted_distance(&s1, &s2);

    let mut score = 1.0 - distance / longer;

    if s1.chars().next() == s2.chars().next() {
        score += FIRST_CHAR_BONUS;
    }
    score += (shorter / longer) * LENGTH_RATIO_BONUS;

    score.min(1.0)
}

/// Levenshtein distance where confusable substitutions cost [`TYPO_SUBSTITUTION_COST`].
///
/// Insertions and deletions always cost 1.0. Uses the two-row formulation.
pub fn typo_weighted_distance(s1: &str, s2: &str) -> f64 {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    let n = s2_chars.len();

    let mut prev: Vec<f64> = (0..=n).map(|j| j as f64).collect();
    let mut curr = vec![0.0; n + 1];

    for (i, &c1) in s1_chars.iter().enumerate() {
        curr[0] = (i + 1) as f64;
        for (j, &c2) in s2_chars.iter().enumerate() {
            curr[j + 1] = if c1 == c2 {
                prev[j]
            } else {
                let substitution = if are_common_typos(c1, c2) {
                    TYPO_SUBSTITUTION_COST
                } else {
                    1.0
                };
                (prev[j] + substitution)
                    .min(curr[j] + 1.0)
                    .min(prev[j + 1] + 1.0)
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Whether two characters form a commonly confused pair, in either direction.
pub fn are_common_typos(c1: char, c2: char) -> bool {
    confusable_with(c1).contains(&c2) || confusable_with(c2).contains(&c1)
}

fn confusable_with(c: char) -> &'static [char] {
    match c {
        'a' => &['e', 'o'],
        'e' => &['a', 'i'],
        'i' => &['e', 'o'],
        'o' => &['a', 'i', 'u'],
        'u' => &['o', 'i'],
        'b' => &['v', 'p'],
        'v' => &['b', 'f'],
        'c' => &['k', 's'],
        'k' => &['c'],
        's' => &['c', 'z'],
        'z' => &['s'],
        'd' => &['t'],
        't' => &['d'],
        'f' => &['v'],
        'g' => &['j'],
        'j' => &['g'],
        'l' => &['1'],
        'm' => &['n'],
        'n' => &['m'],
        'p' => &['b'],
        'q' => &['k'],
        'r' => &['l'],
        'w' => &['v'],
        'x' => &['s'],
        'y' => &['i'],
        _ => &[],
    }
}
