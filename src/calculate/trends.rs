//! Team game logs and scoring trends.
//!
//! Built from player rows: every row carrying a team, a game id and a game
//! date adds to that team's line for that game.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::{keys, StatSchema};
use crate::models::{
    parse_game_date, GameStatRecord, OneDecimal, TeamGameLine, TeamTrend, TrendDirection,
};
use crate::reconcile::{normalize_team_name, team_key};

/// Games listed as recent form.
pub const RECENT_FORM_GAMES: usize = 5;

/// Percent change in scoring beyond which a team is trending.
pub const TREND_THRESHOLD_PCT: f64 = 5.0;

struct TeamLog {
    name: String,
    games: HashMap<String, TeamGameLine>,
}

fn game_date(record: &GameStatRecord) -> Option<NaiveDate> {
    record
        .text_of(&["game_date", "matchtime", "date"])
        .as_deref()
        .and_then(parse_game_date)
}

/// Trends for every team with dated games, best scoring average first.
pub fn team_trends(records: &[GameStatRecord]) -> Vec<TeamTrend> {
    let schema = StatSchema::player_box_score();
    let mut logs: HashMap<String, TeamLog> = HashMap::new();

    for record in records {
        let (Some(team), Some(game_id), Some(date)) =
            (record.team_name(), record.game_id(), game_date(record))
        else {
            continue;
        };
        let key = team_key(&team);
        if key.is_empty() {
            continue;
        }

        let log = logs.entry(key).or_insert_with(|| TeamLog {
            name: normalize_team_name(&team),
            games: HashMap::new(),
        });
        let game = log
            .games
            .entry(game_id.clone())
            .or_insert_with(|| TeamGameLine {
                game_id,
                date,
                points: 0.0,
                rebounds: 0.0,
                assists: 0.0,
            });
        game.points += schema.value_of(keys::POINTS, record);
        game.rebounds += schema.value_of(keys::REBOUNDS, record);
        game.assists += schema.value_of(keys::ASSISTS, record);
    }

    let mut trends: Vec<TeamTrend> = logs
        .into_values()
        .map(|log| build_trend(log.name, log.games.into_values().collect()))
        .collect();

    trends.sort_by(|a, b| {
        b.average_points
            .value()
            .total_cmp(&a.average_points.value())
            .then_with(|| a.team.cmp(&b.team))
    });
    trends
}

/// Trend for one team, matched on the normalized team name.
pub fn team_trend(records: &[GameStatRecord], team: &str) -> Option<TeamTrend> {
    let key = team_key(team);
    if key.is_empty() {
        return None;
    }

    let rows: Vec<GameStatRecord> = records
        .iter()
        .filter(|r| r.team_name().is_some_and(|t| team_key(&t) == key))
        .cloned()
        .collect();
    team_trends(&rows).into_iter().next()
}

fn build_trend(team: String, mut games: Vec<TeamGameLine>) -> TeamTrend {
    games.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.game_id.cmp(&b.game_id)));

    let total: f64 = games.iter().map(|g| g.points).sum();
    let (direction, change) = scoring_trend(&games);
    let recent_form = games[games.len().saturating_sub(RECENT_FORM_GAMES)..]
        .iter()
        .map(|g| g.points)
        .collect();

    TeamTrend {
        team,
        average_points: OneDecimal::ratio(total, games.len() as f64),
        direction,
        change_pct: OneDecimal::new(change.abs()),
        recent_form,
        games,
    }
}

/// Average points of the later half of the games against the earlier half.
/// With an odd count the middle game goes to the later half.
fn scoring_trend(games: &[TeamGameLine]) -> (TrendDirection, f64) {
    if games.len() < 2 {
        return (TrendDirection::Stable, 0.0);
    }

    let mid = games.len() / 2;
    let average = |slice: &[TeamGameLine]| {
        slice.iter().map(|g| g.points).sum::<f64>() / slice.len() as f64
    };
    let (earlier, later) = (average(&games[..mid]), average(&games[mid..]));
    if earlier <= 0.0 {
        return (TrendDirection::Stable, 0.0);
    }

    let change = (later - earlier) / earlier * 100.0;
    let direction = if change > TREND_THRESHOLD_PCT {
        TrendDirection::Up
    } else if change < -TREND_THRESHOLD_PCT {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };
    (direction, change)
}
