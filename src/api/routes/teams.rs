use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use super::{merge_with, team_from_path, CompareParams};
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::compare::compare;
use crate::calculate::standings::standings;
use crate::calculate::team_season;
use crate::calculate::trends::team_trend;
use crate::models::{AggregatedStatLine, Comparison, TeamRecord, TeamTrend};
use crate::reconcile::{normalize_team_name, team_key};

#[derive(Debug, Serialize)]
pub struct TeamSummary {
    pub league_id: String,

    /// Win/loss record from final-scored games, if the team has played any
    pub record: Option<TeamRecord>,

    #[serde(flatten)]
    pub line: AggregatedStatLine,
}

#[derive(Debug, Serialize)]
pub struct TeamRoster {
    pub league_id: String,
    pub team: String,
    pub players: Vec<AggregatedStatLine>,
}

async fn load_team(
    state: &AppState,
    league: &str,
    team: &str,
) -> Result<AggregatedStatLine, ApiError> {
    let rows = state.store.team_stats(league).await;
    team_season(&rows, team, state.config.aggregation.games_rule)
        .ok_or_else(|| ApiError::NotFound(format!("Team '{}' in league '{}'", team, league)))
}

pub async fn team_summary(
    State(state): State<AppState>,
    Path((league, team)): Path<(String, String)>,
) -> Result<Json<TeamSummary>, ApiError> {
    let team = team_from_path(&team);

    let (line, games) = tokio::join!(
        load_team(&state, &league, &team),
        state.store.games(&league)
    );
    let line = line?;

    let key = team_key(&team);
    let record = standings(&league, &games)
        .teams
        .into_iter()
        .find(|r| team_key(&r.team) == key);

    Ok(Json(TeamSummary {
        league_id: league,
        record,
        line,
    }))
}

pub async fn team_roster(
    State(state): State<AppState>,
    Path((league, team)): Path<(String, String)>,
) -> Result<Json<TeamRoster>, ApiError> {
    let team = team_from_path(&team);
    let records = state.store.player_stats(&league).await;

    let players = crate::calculate::leaders::team_roster(
        &records,
        &team,
        state.config.aggregation.games_rule,
        merge_with(&state),
    );
    if players.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No players for team '{}' in league '{}'",
            team, league
        )));
    }

    Ok(Json(TeamRoster {
        league_id: league,
        team: normalize_team_name(&team),
        players,
    }))
}

/// Game log, scoring trend and recent form for one team.
pub async fn team_trends(
    State(state): State<AppState>,
    Path((league, team)): Path<(String, String)>,
) -> Result<Json<TeamTrend>, ApiError> {
    let team = team_from_path(&team);
    let records = state.store.player_stats(&league).await;

    team_trend(&records, &team).map(Json).ok_or_else(|| {
        ApiError::NotFound(format!(
            "No dated games for team '{}' in league '{}'",
            team, league
        ))
    })
}

pub async fn compare_teams(
    State(state): State<AppState>,
    Path(league): Path<String>,
    Query(params): Query<CompareParams>,
) -> Result<Json<Comparison>, ApiError> {
    let (left, right) = params.sides()?;
    let (left, right) = (team_from_path(&left), team_from_path(&right));

    let (left, right) = tokio::join!(
        load_team(&state, &league, &left),
        load_team(&state, &league, &right)
    );

    Ok(Json(compare(&left?, &right?)))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::routes::test_support::{get_json, setup_test_state, write_jsonl};
    use axum::http::StatusCode;
    use serde_json::json;

    fn seed(dir: &std::path::Path) {
        write_jsonl(
            dir,
            "nbl",
            "team_stats.jsonl",
            &[
                json!({"name": "Eagles Senior Men I", "tot_spoints": 80, "tot_sassists": 20,
                       "tot_sturnovers": 12}),
                json!({"name": "Eagles", "tot_spoints": 90, "tot_sassists": 22,
                       "tot_sturnovers": 10}),
                json!({"name": "Hawks", "tot_spoints": 70, "tot_sassists": 15,
                       "tot_sturnovers": 11}),
            ],
        );
        write_jsonl(
            dir,
            "nbl",
            "player_stats.jsonl",
            &[
                json!({"full_name": "Murray Henry", "team": "Eagles Senior Men I",
                       "spoints": 21, "sminutes": "30:00"}),
                json!({"full_name": "Sam Jones", "team": "Eagles",
                       "spoints": 25, "sminutes": "28:00"}),
                json!({"full_name": "John Smith", "team": "Hawks",
                       "spoints": 12, "sminutes": "25:00"}),
            ],
        );
        write_jsonl(
            dir,
            "nbl",
            "games.jsonl",
            &[
                json!({"home_team": "Eagles", "away_team": "Hawks",
                       "home_score": 80, "away_score": 70, "game_date": "2025-01-10"}),
                json!({"home_team": "Hawks", "away_team": "Eagles Senior Men I",
                       "home_score": 75, "away_score": 90, "game_date": "2025-01-17"}),
                json!({"home_team": "Hawks", "away_team": "Eagles",
                       "game_date": "2025-02-01"}),
            ],
        );
    }

    #[tokio::test]
    async fn test_team_summary_with_record() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/leagues/nbl/teams/Eagles/summary").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Eagles");
        assert_eq!(json["games"], 2);
        assert_eq!(json["averages"]["points"], "85.0");
        assert_eq!(json["record"]["wins"], 2);
        assert_eq!(json["record"]["losses"], 0);
    }

    #[tokio::test]
    async fn test_team_summary_accepts_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) =
            get_json(app, "/api/leagues/nbl/teams/Eagles_Senior_Men_I/summary").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Eagles");
    }

    #[tokio::test]
    async fn test_team_summary_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/leagues/nbl/teams/Lions/summary").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_team_roster_merges_team_name_variants() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/leagues/nbl/teams/Eagles/roster").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["team"], "Eagles");
        let players = json["players"].as_array().unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0]["name"], "Sam Jones");
        assert_eq!(players[1]["name"], "Murray Henry");
    }

    #[tokio::test]
    async fn test_team_roster_empty_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let app = build_router(setup_test_state(tmp.path()));

        let (status, _) = get_json(app, "/api/leagues/nbl/teams/Lions/roster").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_team_trends() {
        let tmp = tempfile::tempdir().unwrap();
        write_jsonl(
            tmp.path(),
            "nbl",
            "player_stats.jsonl",
            &[
                json!({"full_name": "Murray Henry", "team": "Eagles Senior Men I",
                       "game_id": "g2", "game_date": "2025-01-17", "spoints": 18}),
                json!({"full_name": "Murray Henry", "team": "Eagles",
                       "game_id": "g1", "game_date": "2025-01-10", "spoints": 24}),
                json!({"full_name": "Sam Jones", "team": "Eagles",
                       "game_id": "g1", "game_date": "2025-01-10", "spoints": 16}),
            ],
        );
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/leagues/nbl/teams/Eagles/trends").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["team"], "Eagles");
        assert_eq!(json["games"][0]["game_id"], "g1");
        assert_eq!(json["games"][0]["date"], "2025-01-10");
        assert_eq!(json["games"][0]["points"], 40.0);
        assert_eq!(json["recent_form"], json!([40.0, 18.0]));
        assert_eq!(json["direction"], "down");
        assert_eq!(json["change_pct"], "55.0");

        let app = build_router(setup_test_state(tmp.path()));
        let (status, _) = get_json(app, "/api/leagues/nbl/teams/Hawks/trends").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_compare_teams() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) =
            get_json(app, "/api/leagues/nbl/teams/compare?left=Eagles&right=Hawks").await;

        assert_eq!(status, StatusCode::OK);
        let rows = json["rows"].as_array().unwrap();
        let tpg = rows.iter().find(|r| r["label"] == "TPG").unwrap();
        assert_eq!(tpg["left"], "11.0");
        assert_eq!(tpg["right"], "11.0");
        assert_eq!(tpg["edge"], "even");

        let ppg = rows.iter().find(|r| r["label"] == "PPG").unwrap();
        assert_eq!(ppg["edge"], "left");
        assert!(rows.iter().all(|r| r["label"] != "MPG"));
    }

    #[tokio::test]
    async fn test_compare_teams_blank_side() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let app = build_router(setup_test_state(tmp.path()));

        let (status, _) =
            get_json(app, "/api/leagues/nbl/teams/compare?left=Eagles&right=%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
