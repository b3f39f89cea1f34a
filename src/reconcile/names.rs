//! Player name normalization and matching.
//!
//! Handles typos, missing middle names, initials against full first names
//! and shirt numbers glued to the front of a name.

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

/// Default Jaro-Winkler acceptance threshold.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Limits for the positional spelling check in [`close_match`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchTolerance {
    /// Largest allowed difference in length, in characters
    pub max_length_diff: usize,

    /// The longer name must be longer than this for typos to be tolerated
    pub min_length: usize,

    /// Largest number of positional mismatches accepted
    pub max_mismatches: usize,
}

impl Default for MatchTolerance {
    fn default() -> Self {
        Self {
            max_length_diff: 2,
            min_length: 5,
            max_mismatches: 2,
        }
    }
}

/// Lower-case, drop everything but letters and spaces, collapse whitespace.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drop leading tokens that are shirt numbers (`"23"`, `"#7"`).
pub fn strip_leading_numbers(name: &str) -> &str {
    let mut rest = name.trim_start();
    loop {
        let token_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let token = &rest[..token_end];
        let digits = token.trim_start_matches('#');
        if token.is_empty() || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return rest;
        }
        rest = rest[token_end..].trim_start();
    }
}

/// Grouping key for a player name.
pub fn name_key(name: &str) -> String {
    normalize_name(strip_leading_numbers(name))
}

/// Count positional mismatches if the two names are close enough in length
/// to be compared at all.
pub fn positional_mismatches(a: &str, b: &str, tolerance: &MatchTolerance) -> Option<usize> {
    let a: Vec<char> = a.trim().to_lowercase().chars().collect();
    let b: Vec<char> = b.trim().to_lowercase().chars().collect();

    let (shorter, longer) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    if longer.len() - shorter.len() > tolerance.max_length_diff
        || longer.len() <= tolerance.min_length
    {
        return None;
    }

    Some(
        shorter
            .iter()
            .zip(longer.iter())
            .filter(|(x, y)| x != y)
            .count(),
    )
}

/// Cheap spelling-tolerant comparison.
///
/// Exact after case-folding and trimming, or close in length with at most
/// `max_mismatches` characters differing position by position. Not an edit
/// distance: an insertion early in the name shifts every later character.
pub fn close_match(a: &str, b: &str, tolerance: &MatchTolerance) -> bool {
    if a.trim().to_lowercase() == b.trim().to_lowercase() {
        return true;
    }

    positional_mismatches(a, b, tolerance).is_some_and(|m| m <= tolerance.max_mismatches)
}

/// Token-wise match where a single letter stands for a full word
/// (`"r farrell"` vs `"rhys farrell"`). Expects normalized input.
pub fn initials_match(a: &str, b: &str) -> bool {
    let parts_a: Vec<&str> = a.split(' ').collect();
    let parts_b: Vec<&str> = b.split(' ').collect();

    if parts_a.len() != parts_b.len() {
        return false;
    }

    parts_a.iter().zip(parts_b.iter()).all(|(p, q)| {
        p == q
            || (p.chars().count() == 1 && q.starts_with(p))
            || (q.chars().count() == 1 && p.starts_with(q))
    })
}

/// Jaro-Winkler similarity of the normalized names.
pub fn similarity(a: &str, b: &str) -> f64 {
    jaro_winkler(&name_key(a), &name_key(b))
}

/// Similarity-based player name match.
///
/// "R Farrell" matches "Rhys Farrell" by initial; "R Farrell" matches
/// "R Farell" by similarity.
pub fn names_match(a: &str, b: &str, threshold: f64) -> bool {
    let n1 = name_key(a);
    let n2 = name_key(b);

    if n1.is_empty() || n2.is_empty() {
        return false;
    }
    if n1 == n2 {
        return true;
    }

    if initials_match(&n1, &n2) {
        return true;
    }

    jaro_winkler(&n1, &n2) >= threshold
}

fn full_words(name: &str) -> usize {
    name.split_whitespace()
        .filter(|p| p.chars().count() > 1)
        .count()
}

/// Pick the most fully spelled-out variant: most non-initial words first,
/// then the longest.
pub fn most_complete_name<S: AsRef<str>>(names: &[S]) -> Option<String> {
    names
        .iter()
        .map(|n| n.as_ref())
        .reduce(|best, current| {
            let (cur_words, best_words) = (full_words(current), full_words(best));
            if cur_words > best_words {
                current
            } else if cur_words < best_words {
                best
            } else if current.len() > best.len() {
                current
            } else {
                best
            }
        })
        .map(str::to_string)
}

/// Turn a player slug back into a searchable name: `"r-farrell-1"` →
/// `"R Farrell"`.
pub fn slug_to_name(slug: &str) -> String {
    let trimmed = match slug.rsplit_once('-') {
        Some((head, tail)) if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) => {
            head
        }
        _ => slug,
    };

    trimmed
        .split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
