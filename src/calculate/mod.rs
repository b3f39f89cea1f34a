//! Statistics calculation engine.
//!
//! Reduces per-game stat rows into season lines and derived views:
//! - Season totals, per-game averages and shooting percentages
//! - League leaderboards and team rosters
//! - Standings from game results
//! - Side-by-side comparisons
//! - Team scoring trends and game previews
//!
//! Every view goes through [`aggregate`], parameterized by a [`StatSchema`]
//! that maps stat keys to the column names a row source uses.

pub mod compare;
pub mod leaders;
pub mod preview;
pub mod standings;
pub mod trends;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{AggregatedStatLine, GameStatRecord, OneDecimal, ShootingSplit};
use crate::reconcile::{normalize_team_name, team_key};

/// A stat key and the row fields it can be read from, in priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub key: String,
    pub sources: Vec<String>,
}

impl FieldMapping {
    pub fn new(key: &str, sources: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Value of the first source field present on the row, else 0.
    pub fn read(&self, record: &GameStatRecord) -> f64 {
        self.sources
            .iter()
            .find(|f| record.has(f))
            .map(|f| record.number(f))
            .unwrap_or(0.0)
    }
}

/// A shooting category read as made/attempted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShootingMapping {
    pub key: String,
    pub made: FieldMapping,
    pub attempted: FieldMapping,
}

impl ShootingMapping {
    pub fn new(key: &str, made: &[&str], attempted: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            made: FieldMapping::new(key, made),
            attempted: FieldMapping::new(key, attempted),
        }
    }
}

/// Whose rows a schema describes. Decides where the display name comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Player,
    Team,
}

/// Field-name mapping for one kind of stat row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSchema {
    pub entity: EntityKind,

    /// Stats summed and averaged per game
    pub counting: Vec<FieldMapping>,

    /// Made/attempted categories turned into percentages
    pub shooting: Vec<ShootingMapping>,

    /// Per-game rates averaged over games rather than re-derived
    pub rates: Vec<FieldMapping>,

    /// Fields holding minutes played; empty when the rows carry none
    pub minutes: Vec<String>,
}

/// Stat keys used by the built-in schemas.
pub mod keys {
    pub const POINTS: &str = "points";
    pub const REBOUNDS: &str = "rebounds";
    pub const OFFENSIVE_REBOUNDS: &str = "offensive_rebounds";
    pub const DEFENSIVE_REBOUNDS: &str = "defensive_rebounds";
    pub const ASSISTS: &str = "assists";
    pub const STEALS: &str = "steals";
    pub const BLOCKS: &str = "blocks";
    pub const TURNOVERS: &str = "turnovers";
    pub const FOULS: &str = "fouls";
    pub const PLUS_MINUS: &str = "plus_minus";

    pub const FIELD_GOALS: &str = "fg";
    pub const THREE_POINTERS: &str = "three";
    pub const FREE_THROWS: &str = "ft";

    pub const EFFECTIVE_FG_PCT: &str = "effective_fg_pct";
    pub const TRUE_SHOOTING_PCT: &str = "true_shooting_pct";
    pub const USAGE_PCT: &str = "usage_pct";
    pub const OFFENSIVE_RATING: &str = "offensive_rating";
    pub const DEFENSIVE_RATING: &str = "defensive_rating";
    pub const NET_RATING: &str = "net_rating";
    pub const PIE: &str = "pie";
}

impl StatSchema {
    /// Player box-score rows (`spoints`, `sreboundstotal`, ... with plain
    /// column names as fallbacks).
    pub fn player_box_score() -> Self {
        Self {
            entity: EntityKind::Player,
            counting: vec![
                FieldMapping::new(keys::POINTS, &["spoints", "points"]),
                FieldMapping::new(
                    keys::REBOUNDS,
                    &["sreboundstotal", "rebounds_total", "rebounds"],
                ),
                FieldMapping::new(
                    keys::OFFENSIVE_REBOUNDS,
                    &["sreboundsoffensive", "rebounds_offensive"],
                ),
                FieldMapping::new(
                    keys::DEFENSIVE_REBOUNDS,
                    &["sreboundsdefensive", "rebounds_defensive"],
                ),
                FieldMapping::new(keys::ASSISTS, &["sassists", "assists"]),
                FieldMapping::new(keys::STEALS, &["ssteals", "steals"]),
                FieldMapping::new(keys::BLOCKS, &["sblocks", "blocks"]),
                FieldMapping::new(keys::TURNOVERS, &["sturnovers", "turnovers"]),
                FieldMapping::new(
                    keys::FOULS,
                    &["sfoulspersonal", "fouls_personal", "personal_fouls"],
                ),
                FieldMapping::new(keys::PLUS_MINUS, &["splusminuspoints", "plus_minus"]),
            ],
            shooting: vec![
                ShootingMapping::new(
                    keys::FIELD_GOALS,
                    &["sfieldgoalsmade", "field_goals_made"],
                    &["sfieldgoalsattempted", "field_goals_attempted"],
                ),
                ShootingMapping::new(
                    keys::THREE_POINTERS,
                    &["sthreepointersmade", "three_pointers_made", "three_pt_made"],
                    &[
                        "sthreepointersattempted",
                        "three_pointers_attempted",
                        "three_pt_attempted",
                    ],
                ),
                ShootingMapping::new(
                    keys::FREE_THROWS,
                    &["sfreethrowsmade", "free_throws_made"],
                    &["sfreethrowsattempted", "free_throws_attempted"],
                ),
            ],
            rates: Vec::new(),
            minutes: vec!["sminutes".to_string(), "minutes".to_string()],
        }
    }

    /// Team aggregate rows, where every box-score column carries a `tot_`
    /// prefix.
    pub fn team_totals() -> Self {
        let prefixed = |fields: &[String]| -> Vec<String> {
            fields
                .iter()
                .filter(|f| f.starts_with('s'))
                .map(|f| format!("tot_{}", f))
                .collect()
        };

        let player = Self::player_box_score();
        Self {
            entity: EntityKind::Team,
            counting: player
                .counting
                .iter()
                .map(|m| FieldMapping {
                    key: m.key.clone(),
                    sources: prefixed(&m.sources),
                })
                .collect(),
            shooting: player
                .shooting
                .iter()
                .map(|s| ShootingMapping {
                    key: s.key.clone(),
                    made: FieldMapping {
                        key: s.key.clone(),
                        sources: prefixed(&s.made.sources),
                    },
                    attempted: FieldMapping {
                        key: s.key.clone(),
                        sources: prefixed(&s.attempted.sources),
                    },
                })
                .collect(),
            rates: Vec::new(),
            minutes: Vec::new(),
        }
    }

    /// Advanced per-game metrics that arrive already normalized.
    pub fn advanced() -> Self {
        Self {
            entity: EntityKind::Player,
            counting: Vec::new(),
            shooting: Vec::new(),
            rates: vec![
                FieldMapping::new(
                    keys::EFFECTIVE_FG_PCT,
                    &["efg_percent", "effective_fg_percentage", "efg"],
                ),
                FieldMapping::new(
                    keys::TRUE_SHOOTING_PCT,
                    &["ts_percent", "true_shooting_percentage"],
                ),
                FieldMapping::new(keys::USAGE_PCT, &["usage_percent", "usage_percentage"]),
                FieldMapping::new(keys::OFFENSIVE_RATING, &["off_rating", "offensive_rating"]),
                FieldMapping::new(keys::DEFENSIVE_RATING, &["def_rating", "defensive_rating"]),
                FieldMapping::new(keys::NET_RATING, &["net_rating"]),
                FieldMapping::new(keys::PIE, &["pie"]),
            ],
            minutes: vec!["sminutes".to_string(), "minutes".to_string()],
        }
    }

    /// Box score plus advanced rates.
    pub fn player_full() -> Self {
        Self::player_box_score().merged(Self::advanced())
    }

    /// Append another schema's mappings. Minutes fields are unioned.
    pub fn merged(mut self, other: StatSchema) -> Self {
        self.counting.extend(other.counting);
        self.shooting.extend(other.shooting);
        self.rates.extend(other.rates);
        for field in other.minutes {
            if !self.minutes.contains(&field) {
                self.minutes.push(field);
            }
        }
        self
    }

    /// Minutes recorded on a row, or `None` if the row has no minutes field.
    pub fn minutes_of(&self, record: &GameStatRecord) -> Option<f64> {
        self.minutes
            .iter()
            .find_map(|f| record.get(f))
            .map(parse_minutes_value)
    }

    /// One row's value for a counting stat, 0 if the schema does not map it.
    pub fn value_of(&self, key: &str, record: &GameStatRecord) -> f64 {
        self.counting
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.read(record))
            .unwrap_or(0.0)
    }

    fn name_of(&self, record: &GameStatRecord) -> Option<String> {
        match self.entity {
            EntityKind::Player => record.player_name(),
            EntityKind::Team => record.text_of(&["name", "team_name", "team"]),
        }
    }
}

/// Which rows count toward games played.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamesRule {
    /// Every returned row is a game.
    EveryRow,

    /// Rows that record zero minutes (did not play) are skipped. Rows with
    /// no minutes field still count.
    #[default]
    ExcludeZeroMinutes,
}

impl GamesRule {
    pub fn counts(&self, minutes: Option<f64>) -> bool {
        match self {
            GamesRule::EveryRow => true,
            GamesRule::ExcludeZeroMinutes => minutes.map_or(true, |m| m > 0.0),
        }
    }
}

/// Convert a minutes string to decimal minutes.
///
/// `"MM:SS"` becomes `MM + SS/60`; a bare number is taken as minutes.
/// Anything malformed or negative yields 0.
pub fn parse_minutes(raw: &str) -> f64 {
    let raw = raw.trim();
    let minutes = match raw.split_once(':') {
        Some((mm, ss)) => match (mm.trim().parse::<u32>(), ss.trim().parse::<u32>()) {
            (Ok(m), Ok(s)) => m as f64 + s as f64 / 60.0,
            _ => 0.0,
        },
        None => raw.parse::<f64>().unwrap_or(0.0),
    };

    if minutes.is_finite() && minutes > 0.0 {
        minutes
    } else {
        0.0
    }
}

fn parse_minutes_value(value: &Value) -> f64 {
    match value {
        Value::String(s) => parse_minutes(s),
        Value::Number(n) => n.as_f64().filter(|m| m.is_finite() && *m > 0.0).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Render decimal minutes as `M:SS`.
pub fn format_minutes(minutes: f64) -> String {
    if !minutes.is_finite() || minutes <= 0.0 {
        return "0:00".to_string();
    }
    let total_seconds = (minutes * 60.0).round() as u64;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Fold one entity's rows into a season line.
///
/// Returns `None` when no row qualifies as a game, so callers can tell "no
/// data" apart from a line of zeros.
pub fn aggregate(
    records: &[GameStatRecord],
    schema: &StatSchema,
    rule: GamesRule,
) -> Option<AggregatedStatLine> {
    let rows: Vec<&GameStatRecord> = records
        .iter()
        .filter(|r| rule.counts(schema.minutes_of(r)))
        .collect();

    if rows.is_empty() {
        return None;
    }

    let games = rows.len() as f64;
    let mut line = AggregatedStatLine {
        name: rows.iter().find_map(|r| schema.name_of(r)),
        team: match schema.entity {
            EntityKind::Player => rows.iter().find_map(|r| r.team_name()),
            EntityKind::Team => None,
        },
        games: rows.len() as u32,
        ..Default::default()
    };

    for mapping in &schema.counting {
        let total: f64 = rows.iter().map(|r| mapping.read(r)).sum();
        line.totals.insert(mapping.key.clone(), total);
        line.averages
            .insert(mapping.key.clone(), OneDecimal::ratio(total, games));
    }

    for mapping in &schema.shooting {
        let made: f64 = rows.iter().map(|r| mapping.made.read(r)).sum();
        let attempted: f64 = rows.iter().map(|r| mapping.attempted.read(r)).sum();
        line.shooting
            .insert(mapping.key.clone(), ShootingSplit::new(made, attempted));
    }

    for mapping in &schema.rates {
        let sum: f64 = rows.iter().map(|r| mapping.read(r)).sum();
        line.rates
            .insert(mapping.key.clone(), OneDecimal::ratio(sum, games));
    }

    if !schema.minutes.is_empty() {
        line.total_minutes = rows.iter().filter_map(|r| schema.minutes_of(r)).sum();
        line.minutes_per_game = OneDecimal::ratio(line.total_minutes, games);
    }

    Some(line)
}

/// Season line for one team from team aggregate rows, matched on the
/// normalized team name.
pub fn team_season(
    records: &[GameStatRecord],
    team: &str,
    rule: GamesRule,
) -> Option<AggregatedStatLine> {
    let key = team_key(team);
    if key.is_empty() {
        return None;
    }

    let schema = StatSchema::team_totals();
    let rows: Vec<GameStatRecord> = records
        .iter()
        .filter(|r| schema.name_of(r).is_some_and(|n| team_key(&n) == key))
        .cloned()
        .collect();

    let mut line = aggregate(&rows, &schema, rule)?;
    line.name = line.name.as_deref().map(normalize_team_name);
    Some(line)
}
