use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::merge_with;
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::leaders::{league_leaders, LeadersOptions};
use crate::calculate::preview::game_preview;
use crate::calculate::trends::team_trends;
use crate::models::{find_game, GamePreview, GameResult, LeagueLeaders, Standings, TeamTrend};

/// Upper bound on entries per leaderboard.
const MAX_LEADERS: usize = 50;

#[derive(Debug, Serialize)]
pub struct LeaguesResponse {
    pub leagues: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GameEntry {
    /// `{home}-vs-{away}-{YYYY-MM-DD}`, when the game has a date
    pub slug: Option<String>,

    #[serde(flatten)]
    pub game: GameResult,
}

impl From<GameResult> for GameEntry {
    fn from(game: GameResult) -> Self {
        Self {
            slug: game.slug(),
            game,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GamesResponse {
    pub league_id: String,
    pub games: Vec<GameEntry>,
}

#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    pub league_id: String,
    pub teams: Vec<TeamTrend>,
}

#[derive(Debug, Deserialize)]
pub struct LeadersParams {
    pub limit: Option<usize>,
}

pub async fn list_leagues(
    State(state): State<AppState>,
) -> Result<Json<LeaguesResponse>, ApiError> {
    let leagues = crate::storage::list_leagues(state.store.config())
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(LeaguesResponse { leagues }))
}

pub async fn leaders(
    State(state): State<AppState>,
    Path(league): Path<String>,
    Query(params): Query<LeadersParams>,
) -> Result<Json<LeagueLeaders>, ApiError> {
    let records = state.store.player_stats(&league).await;
    if records.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No player stats for league '{}'",
            league
        )));
    }

    let aggregation = &state.config.aggregation;
    let options = LeadersOptions {
        limit: params
            .limit
            .unwrap_or(aggregation.leaderboard_size)
            .clamp(1, MAX_LEADERS),
        rule: aggregation.games_rule,
        reconcile_names: aggregation.reconcile_names,
    };

    Ok(Json(league_leaders(
        &league,
        &records,
        &options,
        &state.reconciler,
    )))
}

pub async fn standings(
    State(state): State<AppState>,
    Path(league): Path<String>,
) -> Result<Json<Standings>, ApiError> {
    let games = state.store.games(&league).await;
    let table = crate::calculate::standings::standings(&league, &games);
    if table.teams.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No completed games for league '{}'",
            league
        )));
    }
    Ok(Json(table))
}

/// Games, most recent first. Undated games sort last.
pub async fn games(
    State(state): State<AppState>,
    Path(league): Path<String>,
) -> Result<Json<GamesResponse>, ApiError> {
    let mut games = state.store.games(&league).await;
    if games.is_empty() {
        return Err(ApiError::NotFound(format!("No games for league '{}'", league)));
    }
    games.sort_by(|a, b| b.date().cmp(&a.date()));

    Ok(Json(GamesResponse {
        league_id: league,
        games: games.into_iter().map(GameEntry::from).collect(),
    }))
}

/// One game, addressed by its slug or its upstream id.
pub async fn game(
    State(state): State<AppState>,
    Path((league, game)): Path<(String, String)>,
) -> Result<Json<GameEntry>, ApiError> {
    let games = state.store.games(&league).await;
    find_game(&games, &game)
        .map(|g| Json(GameEntry::from(g.clone())))
        .ok_or_else(|| ApiError::NotFound(format!("Game '{}' in league '{}'", game, league)))
}

/// Recent form and top scorers for both sides of a game.
pub async fn preview(
    State(state): State<AppState>,
    Path((league, game)): Path<(String, String)>,
) -> Result<Json<GamePreview>, ApiError> {
    let (games, team_rows, player_rows) = tokio::join!(
        state.store.games(&league),
        state.store.team_stats(&league),
        state.store.player_stats(&league)
    );

    let found = find_game(&games, &game)
        .ok_or_else(|| ApiError::NotFound(format!("Game '{}' in league '{}'", game, league)))?;

    Ok(Json(game_preview(
        &league,
        found,
        &team_rows,
        &player_rows,
        &games,
        state.config.aggregation.games_rule,
        merge_with(&state),
    )))
}

/// Scoring trends for every team, best average first.
pub async fn trends(
    State(state): State<AppState>,
    Path(league): Path<String>,
) -> Result<Json<TrendsResponse>, ApiError> {
    let records = state.store.player_stats(&league).await;
    let teams = team_trends(&records);
    if teams.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No dated team games for league '{}'",
            league
        )));
    }

    Ok(Json(TrendsResponse {
        league_id: league,
        teams,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::routes::test_support::{get_json, setup_test_state, write_jsonl};
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    fn scorer(name: &str, team: &str, points: u32) -> Value {
        json!({"full_name": name, "team": team, "spoints": points, "sminutes": "20:00"})
    }

    #[tokio::test]
    async fn test_list_leagues() {
        let tmp = tempfile::tempdir().unwrap();
        write_jsonl(tmp.path(), "wnbl", "games.jsonl", &[]);
        write_jsonl(tmp.path(), "nbl", "games.jsonl", &[]);
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/leagues").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["leagues"], json!(["nbl", "wnbl"]));
    }

    #[tokio::test]
    async fn test_leaders_ranked_and_limited() {
        let tmp = tempfile::tempdir().unwrap();
        write_jsonl(
            tmp.path(),
            "nbl",
            "player_stats.jsonl",
            &[
                scorer("Murray Henry", "Eagles", 21),
                scorer("Murray Hendry", "Eagles", 19),
                scorer("John Smith", "Hawks", 30),
                scorer("Sam Jones", "Eagles", 8),
            ],
        );
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/leagues/nbl/leaders?limit=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["league_id"], "nbl");
        let points = json["boards"]
            .as_array()
            .unwrap()
            .iter()
            .find(|b| b["category"] == "points")
            .unwrap();
        let entries = points["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["name"], "John Smith");
        assert_eq!(entries[1]["name"], "Murray Hendry");
        assert_eq!(entries[1]["games_played"], 2);
        assert_eq!(entries[1]["display_value"], "20.0 PPG");
    }

    #[tokio::test]
    async fn test_leaders_unknown_league() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/leagues/nbl/leaders").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_invalid_league_id_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, _) = get_json(app, "/api/leagues/../leaders").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_standings() {
        let tmp = tempfile::tempdir().unwrap();
        write_jsonl(
            tmp.path(),
            "nbl",
            "games.jsonl",
            &[
                json!({"home_team": "Eagles", "away_team": "Hawks",
                       "home_score": 80, "away_score": 70}),
                json!({"home_team": "Lions", "away_team": "Hawks",
                       "home_score": 60, "away_score": 75}),
                json!({"home_team": "Lions", "away_team": "Eagles"}),
            ],
        );
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/leagues/nbl/standings").await;

        assert_eq!(status, StatusCode::OK);
        let teams = json["teams"].as_array().unwrap();
        assert_eq!(teams.len(), 3);
        assert_eq!(teams[0]["team"], "Eagles");
        assert_eq!(teams[0]["win_pct"], "100.0");
        assert_eq!(teams[1]["team"], "Hawks");
        assert_eq!(teams[2]["team"], "Lions");
    }

    #[tokio::test]
    async fn test_games_listed_with_slugs() {
        let tmp = tempfile::tempdir().unwrap();
        write_jsonl(
            tmp.path(),
            "nbl",
            "games.jsonl",
            &[
                json!({"game_id": "g1", "home_team": "Eagles", "away_team": "Hawks",
                       "home_score": 80, "away_score": 70, "game_date": "2025-01-10"}),
                json!({"game_id": "g2", "home_team": "Lions", "away_team": "Eagles",
                       "game_date": "2025-02-01T19:30:00Z"}),
                json!({"game_id": "g3", "home_team": "Hawks", "away_team": "Lions"}),
            ],
        );

        let app = build_router(setup_test_state(tmp.path()));
        let (status, json) = get_json(app, "/api/leagues/nbl/games").await;

        assert_eq!(status, StatusCode::OK);
        let games = json["games"].as_array().unwrap();
        assert_eq!(games[0]["slug"], "lions-vs-eagles-2025-02-01");
        assert_eq!(games[1]["slug"], "eagles-vs-hawks-2025-01-10");
        assert_eq!(games[1]["home_score"], 80);
        assert!(games[2]["slug"].is_null());

        let app = build_router(setup_test_state(tmp.path()));
        let (status, json) =
            get_json(app, "/api/leagues/nbl/games/eagles-vs-hawks-2025-01-10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["game_id"], "g1");

        let app = build_router(setup_test_state(tmp.path()));
        let (status, json) = get_json(app, "/api/leagues/nbl/games/g3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["home_team"], "Hawks");

        let app = build_router(setup_test_state(tmp.path()));
        let (status, _) =
            get_json(app, "/api/leagues/nbl/games/eagles-vs-hawks-2025-03-01").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_game_preview() {
        let tmp = tempfile::tempdir().unwrap();
        write_jsonl(
            tmp.path(),
            "nbl",
            "games.jsonl",
            &[
                json!({"game_id": "g1", "home_team": "Eagles", "away_team": "Hawks",
                       "home_score": "80", "away_score": "70", "game_date": "2025-01-10"}),
                json!({"game_id": "g2", "home_team": "Hawks", "away_team": "Eagles",
                       "game_date": "2025-02-01"}),
            ],
        );
        write_jsonl(
            tmp.path(),
            "nbl",
            "team_stats.jsonl",
            &[
                json!({"name": "Eagles", "numeric_id": 1, "game_id": "g1", "tot_spoints": 80}),
                json!({"name": "Hawks", "numeric_id": 1, "game_id": "g1", "tot_spoints": 70}),
            ],
        );
        write_jsonl(
            tmp.path(),
            "nbl",
            "player_stats.jsonl",
            &[
                scorer("Murray Henry", "Eagles", 22),
                scorer("John Smith", "Hawks", 18),
            ],
        );

        let app = build_router(setup_test_state(tmp.path()));
        let (status, json) =
            get_json(app, "/api/leagues/nbl/games/hawks-vs-eagles-2025-02-01/preview").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["game"]["game_id"], "g2");
        assert_eq!(json["home"]["team"], "Hawks");
        assert_eq!(json["home"]["record"]["losses"], 1);
        assert_eq!(json["home"]["recent_games"][0]["points"], 70.0);
        assert_eq!(json["home"]["top_players"][0]["name"], "John Smith");
        assert_eq!(json["away"]["top_players"][0]["points_per_game"], "22.0");

        let app = build_router(setup_test_state(tmp.path()));
        let (status, _) = get_json(app, "/api/leagues/nbl/games/g9/preview").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_league_trends() {
        let tmp = tempfile::tempdir().unwrap();
        write_jsonl(
            tmp.path(),
            "nbl",
            "player_stats.jsonl",
            &[
                json!({"full_name": "Murray Henry", "team": "Eagles", "game_id": "g1",
                       "game_date": "2025-01-10", "spoints": 20}),
                json!({"full_name": "Murray Henry", "team": "Eagles", "game_id": "g2",
                       "game_date": "2025-01-17", "spoints": 30}),
                json!({"full_name": "John Smith", "team": "Hawks", "game_id": "g1",
                       "game_date": "2025-01-10", "spoints": 12}),
            ],
        );

        let app = build_router(setup_test_state(tmp.path()));
        let (status, json) = get_json(app, "/api/leagues/nbl/trends").await;

        assert_eq!(status, StatusCode::OK);
        let teams = json["teams"].as_array().unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0]["team"], "Eagles");
        assert_eq!(teams[0]["direction"], "up");
        assert_eq!(teams[0]["average_points"], "25.0");
        assert_eq!(teams[1]["direction"], "stable");

        let app = build_router(setup_test_state(tmp.path()));
        let (status, _) = get_json(app, "/api/leagues/other/trends").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_standings_without_results() {
        let tmp = tempfile::tempdir().unwrap();
        write_jsonl(
            tmp.path(),
            "nbl",
            "games.jsonl",
            &[json!({"home_team": "Lions", "away_team": "Eagles"})],
        );
        let app = build_router(setup_test_state(tmp.path()));

        let (status, _) = get_json(app, "/api/leagues/nbl/standings").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
