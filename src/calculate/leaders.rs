//! Player seasons, league leaderboards and team rosters.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::debug;

use super::{aggregate, keys, GamesRule, StatSchema};
use crate::models::{
    AggregatedStatLine, GameStatRecord, LeaderCategory, Leaderboard, LeaderboardEntry,
    LeagueLeaders,
};
use crate::reconcile::{name_key, slug_to_name, team_key, Reconciler};

/// Minimum season field goal attempts to appear on the FG% board.
pub const MIN_FIELD_GOAL_ATTEMPTS: f64 = 2.0;

/// Minimum season attempts for the 3P% and FT% boards.
pub const MIN_THREE_POINT_ATTEMPTS: f64 = 1.0;
pub const MIN_FREE_THROW_ATTEMPTS: f64 = 1.0;

/// Options for building leaderboards.
#[derive(Debug, Clone, Copy)]
pub struct LeadersOptions {
    /// Entries per board
    pub limit: usize,
    pub rule: GamesRule,

    /// Merge unidentified rows whose names reconcile
    pub reconcile_names: bool,
}

impl Default for LeadersOptions {
    fn default() -> Self {
        Self {
            limit: 5,
            rule: GamesRule::default(),
            reconcile_names: true,
        }
    }
}

/// One player's aggregated season.
#[derive(Debug, Clone)]
pub struct PlayerSeason {
    pub player_id: Option<String>,
    pub line: AggregatedStatLine,
}

/// Group player rows into seasons.
///
/// Rows carrying a player id are grouped by id. Rows without one are grouped
/// by name: with a reconciler, near-duplicate spellings on the same team are
/// merged and the most complete spelling is kept; without one, by exact
/// [`name_key`]. Players with no qualifying game are dropped.
pub fn player_seasons(
    records: &[GameStatRecord],
    schema: &StatSchema,
    rule: GamesRule,
    reconciler: Option<&Reconciler>,
) -> Vec<PlayerSeason> {
    let mut by_id: BTreeMap<String, Vec<GameStatRecord>> = BTreeMap::new();
    let mut unidentified = Vec::new();

    for record in records {
        match record.player_id() {
            Some(id) => by_id.entry(id).or_default().push(record.clone()),
            None => unidentified.push(record.clone()),
        }
    }

    let mut groups: Vec<(Option<String>, Option<String>, Vec<GameStatRecord>)> = by_id
        .into_iter()
        .map(|(id, rows)| (Some(id), None, rows))
        .collect();

    match reconciler {
        Some(reconciler) => {
            let merged = reconciler.group_by_entity(
                unidentified,
                |r| r.player_name(),
                |r| r.team_name().map(|t| team_key(&t)).unwrap_or_default(),
            );
            for group in merged {
                let name = (!group.names.is_empty()).then_some(group.canonical_name);
                groups.push((None, name, group.members));
            }
        }
        None => {
            let mut by_name: BTreeMap<String, Vec<GameStatRecord>> = BTreeMap::new();
            for record in unidentified {
                let key = record.player_name().map(|n| name_key(&n)).unwrap_or_default();
                by_name.entry(key).or_default().push(record);
            }
            groups.extend(by_name.into_values().map(|rows| (None, None, rows)));
        }
    }

    let seasons: Vec<PlayerSeason> = groups
        .into_iter()
        .filter_map(|(player_id, name, rows)| {
            let mut line = aggregate(&rows, schema, rule)?;
            if name.is_some() {
                line.name = name;
            }
            Some(PlayerSeason { player_id, line })
        })
        .collect();

    debug!("Built {} player seasons from {} rows", seasons.len(), records.len());
    seasons
}

/// Find a player's season by id, name or player slug.
pub fn find_player<'a>(
    seasons: &'a [PlayerSeason],
    query: &str,
    reconciler: &Reconciler,
) -> Option<&'a PlayerSeason> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    if let Some(season) = seasons
        .iter()
        .find(|s| s.player_id.as_deref() == Some(query))
    {
        return Some(season);
    }

    let as_name = if query.contains('-') && !query.contains(' ') {
        slug_to_name(query)
    } else {
        query.to_string()
    };

    let key = name_key(&as_name);
    seasons
        .iter()
        .find(|s| s.line.name.as_deref().is_some_and(|n| name_key(n) == key))
        .or_else(|| {
            seasons.iter().find(|s| {
                s.line
                    .name
                    .as_deref()
                    .is_some_and(|n| reconciler.is_likely_same(n, &as_name))
            })
        })
}

/// Value a season is ranked by, or `None` if it does not qualify.
fn category_value(category: LeaderCategory, line: &AggregatedStatLine) -> Option<f64> {
    let games = line.games as f64;
    let per_game = |key: &str| line.total(key) / games;
    let shooting = |key: &str, min_attempts: f64| {
        let split = line.split(key);
        (split.attempted >= min_attempts).then(|| split.made / split.attempted * 100.0)
    };

    match category {
        LeaderCategory::Points => Some(per_game(keys::POINTS)),
        LeaderCategory::Rebounds => Some(per_game(keys::REBOUNDS)),
        LeaderCategory::Assists => Some(per_game(keys::ASSISTS)),
        LeaderCategory::Steals => Some(per_game(keys::STEALS)),
        LeaderCategory::Blocks => Some(per_game(keys::BLOCKS)),
        LeaderCategory::FieldGoalPercentage => {
            shooting(keys::FIELD_GOALS, MIN_FIELD_GOAL_ATTEMPTS)
        }
        LeaderCategory::ThreePointPercentage => {
            shooting(keys::THREE_POINTERS, MIN_THREE_POINT_ATTEMPTS)
        }
        LeaderCategory::FreeThrowPercentage => {
            shooting(keys::FREE_THROWS, MIN_FREE_THROW_ATTEMPTS)
        }
        LeaderCategory::GamesPlayed => Some(games),
    }
}

/// Rank seasons for one category. Ties are broken by name.
pub fn leaderboard(
    category: LeaderCategory,
    seasons: &[PlayerSeason],
    limit: usize,
) -> Leaderboard {
    let mut ranked: Vec<(&PlayerSeason, f64)> = seasons
        .iter()
        .filter(|s| s.line.games > 0)
        .filter_map(|s| category_value(category, &s.line).map(|v| (s, v)))
        .collect();

    ranked.sort_by(|(a, va), (b, vb)| {
        vb.partial_cmp(va)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.line.display_name().cmp(b.line.display_name()))
    });

    let entries = ranked
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (season, value))| LeaderboardEntry {
            rank: i as u32 + 1,
            player_id: season.player_id.clone(),
            name: season.line.display_name().to_string(),
            team: season.line.team.clone(),
            games_played: season.line.games,
            value,
            display_value: category.display_value(value),
        })
        .collect();

    Leaderboard { category, entries }
}

/// Every leaderboard for a league.
pub fn league_leaders(
    league_id: &str,
    records: &[GameStatRecord],
    options: &LeadersOptions,
    reconciler: &Reconciler,
) -> LeagueLeaders {
    let seasons = player_seasons(
        records,
        &StatSchema::player_box_score(),
        options.rule,
        options.reconcile_names.then_some(reconciler),
    );

    let boards = LeaderCategory::ALL
        .iter()
        .map(|&category| leaderboard(category, &seasons, options.limit))
        .collect();

    LeagueLeaders::new(league_id, boards)
}

/// Player rows belonging to one team, matched on the normalized team name.
pub fn team_rows(records: &[GameStatRecord], team: &str) -> Vec<GameStatRecord> {
    let key = team_key(team);
    if key.is_empty() {
        return Vec::new();
    }

    records
        .iter()
        .filter(|r| r.team_name().is_some_and(|t| team_key(&t) == key))
        .cloned()
        .collect()
}

/// Season lines for every player on a team, best scorer first.
pub fn team_roster(
    records: &[GameStatRecord],
    team: &str,
    rule: GamesRule,
    reconciler: Option<&Reconciler>,
) -> Vec<AggregatedStatLine> {
    let rows = team_rows(records, team);
    let mut roster: Vec<AggregatedStatLine> =
        player_seasons(&rows, &StatSchema::player_box_score(), rule, reconciler)
            .into_iter()
            .map(|s| s.line)
            .collect();

    roster.sort_by(|a, b| {
        let ppg = |l: &AggregatedStatLine| l.total(keys::POINTS) / l.games as f64;
        ppg(b)
            .partial_cmp(&ppg(a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.display_name().cmp(b.display_name()))
    });

    roster
}
