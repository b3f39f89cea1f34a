//! Derived league statistics models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{GameResult, OneDecimal};

/// Leaderboard categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderCategory {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    FieldGoalPercentage,
    ThreePointPercentage,
    FreeThrowPercentage,
    GamesPlayed,
}

impl LeaderCategory {
    pub const ALL: [LeaderCategory; 9] = [
        LeaderCategory::Points,
        LeaderCategory::Rebounds,
        LeaderCategory::Assists,
        LeaderCategory::Steals,
        LeaderCategory::Blocks,
        LeaderCategory::FieldGoalPercentage,
        LeaderCategory::ThreePointPercentage,
        LeaderCategory::FreeThrowPercentage,
        LeaderCategory::GamesPlayed,
    ];

    /// Short unit label shown after the value.
    pub fn unit(&self) -> &'static str {
        match self {
            LeaderCategory::Points => "PPG",
            LeaderCategory::Rebounds => "RPG",
            LeaderCategory::Assists => "APG",
            LeaderCategory::Steals => "SPG",
            LeaderCategory::Blocks => "BPG",
            LeaderCategory::FieldGoalPercentage
            | LeaderCategory::ThreePointPercentage
            | LeaderCategory::FreeThrowPercentage => "%",
            LeaderCategory::GamesPlayed => "Games",
        }
    }

    /// Format a value the way the leaderboard shows it.
    pub fn display_value(&self, value: f64) -> String {
        match self {
            LeaderCategory::FieldGoalPercentage
            | LeaderCategory::ThreePointPercentage
            | LeaderCategory::FreeThrowPercentage => format!("{}%", OneDecimal::new(value)),
            LeaderCategory::GamesPlayed => format!("{} Games", value as u32),
            _ => format!("{} {}", OneDecimal::new(value), self.unit()),
        }
    }
}

impl std::fmt::Display for LeaderCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaderCategory::Points => write!(f, "Points"),
            LeaderCategory::Rebounds => write!(f, "Rebounds"),
            LeaderCategory::Assists => write!(f, "Assists"),
            LeaderCategory::Steals => write!(f, "Steals"),
            LeaderCategory::Blocks => write!(f, "Blocks"),
            LeaderCategory::FieldGoalPercentage => write!(f, "Field Goal %"),
            LeaderCategory::ThreePointPercentage => write!(f, "Three Point %"),
            LeaderCategory::FreeThrowPercentage => write!(f, "Free Throw %"),
            LeaderCategory::GamesPlayed => write!(f, "Games Played"),
        }
    }
}

/// One row on a leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub player_id: Option<String>,
    pub name: String,
    pub team: Option<String>,
    pub games_played: u32,
    pub value: f64,
    pub display_value: String,
}

/// A ranked board for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboard {
    pub category: LeaderCategory,
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn leader(&self) -> Option<&LeaderboardEntry> {
        self.entries.first()
    }
}

/// All leaderboards for a league.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueLeaders {
    pub league_id: String,
    pub computed_at: DateTime<Utc>,
    pub boards: Vec<Leaderboard>,
}

impl LeagueLeaders {
    pub fn new(league_id: impl Into<String>, boards: Vec<Leaderboard>) -> Self {
        Self {
            league_id: league_id.into(),
            computed_at: Utc::now(),
            boards,
        }
    }

    pub fn board(&self, category: LeaderCategory) -> Option<&Leaderboard> {
        self.boards.iter().find(|b| b.category == category)
    }
}

/// Win/loss record for one team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRecord {
    pub team: String,
    pub wins: u32,
    pub losses: u32,
    pub points_for: u32,
    pub points_against: u32,

    /// Win percentage (0-100)
    pub win_pct: OneDecimal,

    pub points_for_per_game: OneDecimal,
    pub points_against_per_game: OneDecimal,
}

impl TeamRecord {
    /// Create a record with its derived rates filled in.
    pub fn new(
        team: String,
        wins: u32,
        losses: u32,
        points_for: u32,
        points_against: u32,
    ) -> Self {
        let games = (wins + losses) as f64;

        Self {
            team,
            wins,
            losses,
            points_for,
            points_against,
            win_pct: OneDecimal::percentage(wins as f64, games),
            points_for_per_game: OneDecimal::ratio(points_for as f64, games),
            points_against_per_game: OneDecimal::ratio(points_against as f64, games),
        }
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn point_differential(&self) -> i64 {
        self.points_for as i64 - self.points_against as i64
    }

    /// Unrounded win fraction, used for ordering.
    pub fn win_fraction(&self) -> f64 {
        if self.games() == 0 {
            0.0
        } else {
            self.wins as f64 / self.games() as f64
        }
    }
}

/// League table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standings {
    pub league_id: String,
    pub computed_at: DateTime<Utc>,
    pub teams: Vec<TeamRecord>,
}

impl Standings {
    pub fn new(league_id: impl Into<String>, teams: Vec<TeamRecord>) -> Self {
        Self {
            league_id: league_id.into(),
            computed_at: Utc::now(),
            teams,
        }
    }

    /// Get a team's record by name.
    pub fn get_team(&self, name: &str) -> Option<&TeamRecord> {
        self.teams.iter().find(|t| t.team.eq_ignore_ascii_case(name))
    }

    pub fn leader(&self) -> Option<&TeamRecord> {
        self.teams.first()
    }
}

/// Direction of a team's scoring across the season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// A team's combined output in one game, summed from its players' rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamGameLine {
    pub game_id: String,
    pub date: NaiveDate,
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
}

/// Game log and scoring trend for one team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamTrend {
    pub team: String,

    /// Oldest game first
    pub games: Vec<TeamGameLine>,

    pub average_points: OneDecimal,

    /// Second half of the season against the first half
    pub direction: TrendDirection,

    /// Size of that change, in percent
    pub change_pct: OneDecimal,

    /// Points in the last five games, oldest first
    pub recent_form: Vec<f64>,
}

/// A team aggregate row shown as recent form in a game preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTeamGame {
    pub game_id: Option<String>,
    pub opponent: Option<String>,
    pub points: f64,
}

/// A roster entry in a game preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewPlayer {
    pub name: String,
    pub games: u32,
    pub points_per_game: OneDecimal,
    pub rebounds_per_game: OneDecimal,
    pub assists_per_game: OneDecimal,
}

/// One side of a game preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewSide {
    pub team: String,
    pub record: Option<TeamRecord>,

    /// Most recent first
    pub recent_games: Vec<RecentTeamGame>,

    /// Best scorers first
    pub top_players: Vec<PreviewPlayer>,
}

/// Head-to-head preview of a scheduled or played game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamePreview {
    pub league_id: String,
    pub game: GameResult,
    pub home: PreviewSide,
    pub away: PreviewSide,
}

/// Which side of a comparison is ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Left,
    Right,
    Even,
}

/// One stat shown side by side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub label: String,
    pub left: String,
    pub right: String,
    pub edge: Edge,
}

/// Two aggregated lines compared row by row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub left_name: String,
    pub right_name: String,
    pub rows: Vec<ComparisonRow>,
}
