//! Game results and game slugs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A scheduled or completed game between two teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    #[serde(default)]
    pub game_id: Option<String>,

    /// Date or timestamp string as stored upstream
    #[serde(default, alias = "matchtime")]
    pub game_date: Option<String>,

    #[serde(alias = "hometeam")]
    pub home_team: String,

    #[serde(alias = "awayteam")]
    pub away_team: String,

    /// `None` until the game has been played
    #[serde(
        default,
        alias = "homeScore",
        deserialize_with = "deserialize_score"
    )]
    pub home_score: Option<u32>,

    #[serde(
        default,
        alias = "awayScore",
        deserialize_with = "deserialize_score"
    )]
    pub away_score: Option<u32>,
}

/// Deserialize a score that may be a number or a string containing one.
/// Anything else reads as "not played".
fn deserialize_score<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let val: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(val.and_then(|v| match v {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
            .and_then(|x| u32::try_from(x).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

impl GameResult {
    pub fn new(home_team: impl Into<String>, away_team: impl Into<String>) -> Self {
        Self {
            game_id: None,
            game_date: None,
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_score: None,
            away_score: None,
        }
    }

    pub fn with_score(mut self, home: u32, away: u32) -> Self {
        self.home_score = Some(home);
        self.away_score = Some(away);
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.game_date = Some(date.into());
        self
    }

    /// Both scores, once the game is final.
    pub fn final_score(&self) -> Option<(u32, u32)> {
        Some((self.home_score?, self.away_score?))
    }

    /// Calendar date of the game. Accepts `YYYY-MM-DD` and RFC 3339 timestamps.
    pub fn date(&self) -> Option<NaiveDate> {
        parse_game_date(self.game_date.as_deref()?)
    }

    pub fn slug(&self) -> Option<String> {
        Some(game_slug(&self.home_team, &self.away_team, self.date()?))
    }
}

/// Find a game by its slug or its upstream id.
pub fn find_game<'a>(games: &'a [GameResult], key: &str) -> Option<&'a GameResult> {
    let by_slug = is_game_slug(key);
    games.iter().find(|g| {
        if by_slug {
            g.slug().as_deref() == Some(key)
        } else {
            g.game_id.as_deref() == Some(key)
        }
    })
}

/// Calendar date from a `YYYY-MM-DD` string or an RFC 3339 timestamp.
pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&chrono::Utc).date_naive());
    }
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

/// Components of a parsed game slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSlug {
    pub home: String,
    pub away: String,
    pub date: String,
}

/// Lower-case ASCII slug with runs of other characters collapsed to `-`.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    out
}

/// URL slug for a game: `{home}-vs-{away}-{YYYY-MM-DD}`.
pub fn game_slug(home_team: &str, away_team: &str, date: NaiveDate) -> String {
    format!(
        "{}-vs-{}-{}",
        slugify(home_team),
        slugify(away_team),
        date.format("%Y-%m-%d")
    )
}

/// Split a game slug back into its parts.
pub fn parse_game_slug(slug: &str) -> Option<GameSlug> {
    let (home, rest) = slug.split_once("-vs-")?;
    let split = rest.len().checked_sub(10)?;
    if !rest.is_char_boundary(split) {
        return None;
    }
    let (head, date) = rest.split_at(split);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let away = head.strip_suffix('-').unwrap_or(head);

    Some(GameSlug {
        home: home.to_string(),
        away: away.to_string(),
        date: date.to_string(),
    })
}

pub fn is_game_slug(value: &str) -> bool {
    parse_game_slug(value).is_some_and(|s| !s.home.is_empty() && !s.away.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_slug() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 8).unwrap();
        assert_eq!(
            game_slug("Worcester Wolves!", "Solent Kestrels II", date),
            "worcester-wolves-vs-solent-kestrels-ii-2025-03-08"
        );
    }

    #[test]
    fn test_parse_game_slug() {
        let parsed = parse_game_slug("worcester-wolves-vs-solent-kestrels-2025-03-08").unwrap();
        assert_eq!(parsed.home, "worcester-wolves");
        assert_eq!(parsed.away, "solent-kestrels");
        assert_eq!(parsed.date, "2025-03-08");
    }

    #[test]
    fn test_parse_game_slug_rejects_malformed() {
        assert!(parse_game_slug("worcester-wolves-2025-03-08").is_none());
        assert!(parse_game_slug("a-vs-b").is_none());
        assert!(!is_game_slug("-vs-b-2025-03-08"));
        assert!(is_game_slug("a-vs-b-2025-03-08"));
    }

    #[test]
    fn test_game_result_date_formats() {
        let plain = GameResult::new("A", "B").with_date("2025-01-15");
        assert_eq!(plain.date(), NaiveDate::from_ymd_opt(2025, 1, 15));

        let ts = GameResult::new("A", "B").with_date("2025-01-15T19:30:00+00:00");
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2025, 1, 15));
        assert_eq!(ts.slug().as_deref(), Some("a-vs-b-2025-01-15"));

        assert!(GameResult::new("A", "B").date().is_none());
    }

    #[test]
    fn test_game_result_deserialize_aliases() {
        let json = r#"{"hometeam":"Eagles","awayteam":"Hawks","matchtime":"2025-02-01","home_score":80,"away_score":75}"#;
        let game: GameResult = serde_json::from_str(json).unwrap();
        assert_eq!(game.home_team, "Eagles");
        assert_eq!(game.final_score(), Some((80, 75)));
    }

    #[test]
    fn test_find_game_by_slug_or_id() {
        let games = vec![
            GameResult::new("Eagles", "Hawks").with_date("2025-01-10"),
            GameResult {
                game_id: Some("g2".to_string()),
                ..GameResult::new("Hawks", "Lions")
            },
        ];

        assert_eq!(
            find_game(&games, "eagles-vs-hawks-2025-01-10").map(|g| g.home_team.as_str()),
            Some("Eagles")
        );
        assert_eq!(find_game(&games, "g2").map(|g| g.away_team.as_str()), Some("Lions"));
        assert!(find_game(&games, "eagles-vs-hawks-2025-01-11").is_none());
    }

    #[test]
    fn test_game_result_string_scores() {
        let json = r#"{"home_team":"Eagles","away_team":"Hawks","home_score":"80","away_score":" 75 "}"#;
        let game: GameResult = serde_json::from_str(json).unwrap();
        assert_eq!(game.final_score(), Some((80, 75)));

        let json = r#"{"home_team":"Eagles","away_team":"Hawks","homeScore":66.0,"awayScore":""}"#;
        let game: GameResult = serde_json::from_str(json).unwrap();
        assert_eq!(game.home_score, Some(66));
        assert_eq!(game.away_score, None);

        let json = r#"{"home_team":"Eagles","away_team":"Hawks","home_score":null,"away_score":"TBD"}"#;
        let game: GameResult = serde_json::from_str(json).unwrap();
        assert_eq!(game.final_score(), None);
    }
}
