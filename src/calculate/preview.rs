//! Head-to-head game previews: each side's latest results and top scorers.

use super::leaders::team_roster;
use super::standings::standings;
use super::{keys, GamesRule, StatSchema};
use crate::models::{
    GamePreview, GameResult, GameStatRecord, PreviewPlayer, PreviewSide, RecentTeamGame,
};
use crate::reconcile::{normalize_team_name, team_key, Reconciler};

/// Team aggregate rows shown per side.
pub const PREVIEW_RECENT_GAMES: usize = 5;

/// Players shown per side.
pub const PREVIEW_ROSTER_SIZE: usize = 10;

/// Latest team aggregate rows for one team, highest `numeric_id` first.
/// Rows without one keep file order after those that have it.
pub fn recent_team_games(
    records: &[GameStatRecord],
    team: &str,
    limit: usize,
) -> Vec<RecentTeamGame> {
    let key = team_key(team);
    if key.is_empty() {
        return Vec::new();
    }

    let schema = StatSchema::team_totals();
    let mut rows: Vec<&GameStatRecord> = records
        .iter()
        .filter(|r| schema.name_of(r).is_some_and(|n| team_key(&n) == key))
        .collect();
    rows.sort_by(|a, b| {
        let id = |r: &GameStatRecord| r.has("numeric_id").then(|| r.number("numeric_id"));
        match (id(a), id(b)) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });

    rows.into_iter()
        .take(limit)
        .map(|r| RecentTeamGame {
            game_id: r.game_id(),
            opponent: r.opponent(),
            points: schema.value_of(keys::POINTS, r),
        })
        .collect()
}

/// A team's best scorers by points per game.
pub fn top_players(
    records: &[GameStatRecord],
    team: &str,
    rule: GamesRule,
    reconciler: Option<&Reconciler>,
    limit: usize,
) -> Vec<PreviewPlayer> {
    team_roster(records, team, rule, reconciler)
        .into_iter()
        .take(limit)
        .map(|line| PreviewPlayer {
            name: line.display_name().to_string(),
            games: line.games,
            points_per_game: line.average(keys::POINTS),
            rebounds_per_game: line.average(keys::REBOUNDS),
            assists_per_game: line.average(keys::ASSISTS),
        })
        .collect()
}

/// Preview both sides of a game.
pub fn game_preview(
    league_id: &str,
    game: &GameResult,
    team_rows: &[GameStatRecord],
    player_rows: &[GameStatRecord],
    games: &[GameResult],
    rule: GamesRule,
    reconciler: Option<&Reconciler>,
) -> GamePreview {
    let table = standings(league_id, games);

    let side = |team: &str| {
        let key = team_key(team);
        PreviewSide {
            team: normalize_team_name(team),
            record: table
                .teams
                .iter()
                .find(|r| team_key(&r.team) == key)
                .cloned(),
            recent_games: recent_team_games(team_rows, team, PREVIEW_RECENT_GAMES),
            top_players: top_players(player_rows, team, rule, reconciler, PREVIEW_ROSTER_SIZE),
        }
    };

    GamePreview {
        league_id: league_id.to_string(),
        game: game.clone(),
        home: side(&game.home_team),
        away: side(&game.away_team),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn rows(values: Vec<Value>) -> Vec<GameStatRecord> {
        values.into_iter().map(GameStatRecord::from).collect()
    }

    #[test]
    fn test_recent_team_games_newest_first() {
        let records = rows(
            (1..=7)
                .map(|id| {
                    json!({"name": "Eagles", "numeric_id": id, "game_id": format!("g{}", id),
                           "opponent": "Hawks", "tot_spoints": 60 + id})
                })
                .chain([json!({"name": "Hawks", "numeric_id": 99, "tot_spoints": 50})])
                .collect(),
        );

        let recent = recent_team_games(&records, "Eagles Senior Men", PREVIEW_RECENT_GAMES);

        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].game_id.as_deref(), Some("g7"));
        assert_eq!(recent[0].points, 67.0);
        assert_eq!(recent[0].opponent.as_deref(), Some("Hawks"));
        assert_eq!(recent[4].game_id.as_deref(), Some("g3"));
    }

    #[test]
    fn test_recent_team_games_without_numeric_id_last() {
        let records = rows(vec![
            json!({"name": "Eagles", "game_id": "a", "tot_spoints": 70}),
            json!({"name": "Eagles", "numeric_id": "4", "game_id": "b", "tot_spoints": 75}),
        ]);

        let recent = recent_team_games(&records, "Eagles", 5);
        assert_eq!(recent[0].game_id.as_deref(), Some("b"));
        assert_eq!(recent[1].game_id.as_deref(), Some("a"));
        assert!(recent_team_games(&records, "", 5).is_empty());
    }

    #[test]
    fn test_top_players_by_points_per_game() {
        let mut values: Vec<Value> = (0..12)
            .map(|i| json!({"full_name": format!("Player {}", (b'A' + i) as char),
                            "team": "Eagles", "spoints": i, "sreboundstotal": 3, "sassists": 1}))
            .collect();
        values.push(json!({"full_name": "Player L", "team": "Eagles", "spoints": 21,
                           "sreboundstotal": 5, "sassists": 3}));
        let records = rows(values);

        let players = top_players(&records, "Eagles", GamesRule::EveryRow, None, PREVIEW_ROSTER_SIZE);

        assert_eq!(players.len(), 10);
        // Player L: 11 + 21 over two games
        assert_eq!(players[0].name, "Player L");
        assert_eq!(players[0].games, 2);
        assert_eq!(players[0].points_per_game.to_string(), "16.0");
        assert_eq!(players[0].rebounds_per_game.to_string(), "4.0");
        assert_eq!(players[1].name, "Player K");
    }

    #[test]
    fn test_game_preview_both_sides() {
        let team_rows = rows(vec![
            json!({"name": "Eagles", "numeric_id": 1, "tot_spoints": 80}),
            json!({"name": "Hawks", "numeric_id": 1, "tot_spoints": 70}),
        ]);
        let player_rows = rows(vec![
            json!({"full_name": "Murray Henry", "team": "Eagles", "spoints": 22}),
            json!({"full_name": "John Smith", "team": "Hawks Senior Men I", "spoints": 18}),
        ]);
        let games = vec![
            GameResult::new("Eagles", "Hawks").with_score(80, 70).with_date("2025-01-10"),
            GameResult::new("Hawks", "Eagles").with_date("2025-02-01"),
        ];

        let preview = game_preview(
            "nbl",
            &games[1],
            &team_rows,
            &player_rows,
            &games,
            GamesRule::default(),
            None,
        );

        assert_eq!(preview.league_id, "nbl");
        assert_eq!(preview.home.team, "Hawks");
        assert_eq!(preview.home.top_players[0].name, "John Smith");
        assert_eq!(preview.home.recent_games[0].points, 70.0);
        assert_eq!(preview.home.record.as_ref().map(|r| r.losses), Some(1));
        assert_eq!(preview.away.team, "Eagles");
        assert_eq!(preview.away.top_players[0].name, "Murray Henry");
        assert_eq!(preview.away.record.as_ref().map(|r| r.wins), Some(1));
    }
}
