//! Team name normalization.
//!
//! Upstream feeds record the same side as "Worcester Wolves",
//! "Worcester Wolves Senior Men" and "Worcester Wolves Senior Men I".
//! Second and third teams ("II", "III", "IV") are separate sides and keep
//! their numeral.

use std::sync::LazyLock;

use regex::Regex;

static SENIOR_MEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+senior\s+men\s*").expect("valid regex"));

// No lookahead in `regex`: requiring whitespace before the lone `I` keeps
// "II" and "III" intact.
static TRAILING_FIRST_TEAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+I\s*$").expect("valid regex"));

/// Canonical display form of a team name.
///
/// - `"Worcester Wolves Senior Men I"` → `"Worcester Wolves"`
/// - `"Worcester Wolves II"` → `"Worcester Wolves II"`
/// - `"Team Name!"` → `"Team Name"`
pub fn normalize_team_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        return String::new();
    }

    let without_suffix = SENIOR_MEN.replace_all(name, " ");
    let without_bang = without_suffix.replace('!', "");
    let without_numeral = TRAILING_FIRST_TEAM.replace(&without_bang, "");

    without_numeral.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Grouping key for a team: the normalized name, lower-cased.
pub fn team_key(name: &str) -> String {
    normalize_team_name(name).to_lowercase()
}

/// Normalized name with spaces replaced, for file paths.
pub fn team_file_name(name: &str) -> String {
    normalize_team_name(name).replace(' ', "_")
}

/// Whether two team names denote the same side.
pub fn teams_match(a: &str, b: &str) -> bool {
    let (ka, kb) = (team_key(a), team_key(b));
    !ka.is_empty() && ka == kb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_senior_men_and_first_team() {
        assert_eq!(normalize_team_name("Worcester Wolves Senior Men I"), "Worcester Wolves");
        assert_eq!(normalize_team_name("Worcester Wolves Senior Men"), "Worcester Wolves");
        assert_eq!(normalize_team_name("Solent Kestrels senior men i"), "Solent Kestrels");
    }

    #[test]
    fn test_keeps_other_numerals() {
        assert_eq!(normalize_team_name("Worcester Wolves II"), "Worcester Wolves II");
        assert_eq!(normalize_team_name("Worcester Wolves III"), "Worcester Wolves III");
        assert_eq!(normalize_team_name("Worcester Wolves IV"), "Worcester Wolves IV");
        assert_eq!(
            normalize_team_name("Worcester Wolves Senior Men II"),
            "Worcester Wolves II"
        );
    }

    #[test]
    fn test_strips_bang_and_whitespace() {
        assert_eq!(normalize_team_name("  Team   Name! "), "Team Name");
        assert_eq!(normalize_team_name(""), "");
    }

    #[test]
    fn test_eagles_variants_share_key() {
        assert_eq!(team_key("Eagles Senior Men I"), team_key("Eagles I"));
        assert_eq!(team_key("Eagles I"), "eagles");
        assert!(teams_match("Eagles Senior Men I", "eagles"));
        assert!(!teams_match("Eagles", "Eagles II"));
        assert!(!teams_match("", ""));
    }

    #[test]
    fn test_name_inside_word_untouched() {
        // The trailing "I" must be its own token
        assert_eq!(normalize_team_name("Team Hawaii"), "Team Hawaii");
    }

    #[test]
    fn test_team_file_name() {
        assert_eq!(team_file_name("Worcester Wolves Senior Men I"), "Worcester_Wolves");
    }
}
