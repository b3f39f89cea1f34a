use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use super::{merge_with, CompareParams};
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::compare::compare;
use crate::calculate::leaders::{find_player, player_seasons, PlayerSeason};
use crate::calculate::{format_minutes, StatSchema};
use crate::models::{AggregatedStatLine, Comparison};

#[derive(Debug, Serialize)]
pub struct PlayerSummary {
    pub league_id: String,
    pub player_id: Option<String>,

    /// Minutes per game as `M:SS`
    pub minutes_display: String,

    #[serde(flatten)]
    pub line: AggregatedStatLine,
}

async fn load_player(
    state: &AppState,
    league: &str,
    player: &str,
) -> Result<PlayerSeason, ApiError> {
    let records = state.store.player_stats(league).await;
    let seasons = player_seasons(
        &records,
        &StatSchema::player_full(),
        state.config.aggregation.games_rule,
        merge_with(state),
    );

    find_player(&seasons, player, &state.reconciler)
        .cloned()
        .ok_or_else(|| {
            ApiError::NotFound(format!("Player '{}' in league '{}'", player, league))
        })
}

pub async fn player_summary(
    State(state): State<AppState>,
    Path((league, player)): Path<(String, String)>,
) -> Result<Json<PlayerSummary>, ApiError> {
    let season = load_player(&state, &league, &player).await?;
    let minutes = season.line.total_minutes / season.line.games.max(1) as f64;

    Ok(Json(PlayerSummary {
        league_id: league,
        player_id: season.player_id,
        minutes_display: format_minutes(minutes),
        line: season.line,
    }))
}

pub async fn compare_players(
    State(state): State<AppState>,
    Path(league): Path<String>,
    Query(params): Query<CompareParams>,
) -> Result<Json<Comparison>, ApiError> {
    let (left, right) = params.sides()?;

    let (left, right) = tokio::join!(
        load_player(&state, &league, &left),
        load_player(&state, &league, &right)
    );

    Ok(Json(compare(&left?.line, &right?.line)))
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
            "player_stats.jsonl",
            &[
                json!({"player_id": "p1", "full_name": "Murray Henry", "team": "Eagles",
                       "spoints": 20, "sfieldgoalsmade": 5, "sfieldgoalsattempted": 10,
                       "sminutes": "30:30", "sassists": 4}),
                json!({"player_id": "p1", "full_name": "Murray Henry", "team": "Eagles",
                       "spoints": 10, "sfieldgoalsmade": 2, "sfieldgoalsattempted": 8,
                       "sminutes": "29:30", "sassists": 6}),
                json!({"full_name": "John Smith", "team": "Hawks",
                       "spoints": 12, "sminutes": "25:00", "sassists": 5}),
                json!({"full_name": "John Smith", "team": "Hawks",
                       "spoints": 0, "sminutes": "0:00"}),
            ],
        );
    }

    #[tokio::test]
    async fn test_player_summary_by_id() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/leagues/nbl/players/p1/summary").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["league_id"], "nbl");
        assert_eq!(json["player_id"], "p1");
        assert_eq!(json["name"], "Murray Henry");
        assert_eq!(json["games"], 2);
        assert_eq!(json["averages"]["points"], "15.0");
        assert_eq!(json["shooting"]["fg"]["percentage"], "38.9");
        assert_eq!(json["minutes_display"], "30:00");
    }

    #[tokio::test]
    async fn test_player_summary_by_slug() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/leagues/nbl/players/john-smith/summary").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "John Smith");
        // The zero-minute row is not a game.
        assert_eq!(json["games"], 1);
        assert_eq!(json["averages"]["points"], "12.0");
    }

    #[tokio::test]
    async fn test_player_summary_tolerates_misspelling() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) =
            get_json(app, "/api/leagues/nbl/players/Murray%20Hendry/summary").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Murray Henry");
    }

    #[tokio::test]
    async fn test_player_summary_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/leagues/nbl/players/nobody/summary").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_compare_players() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(
            app,
            "/api/leagues/nbl/players/compare?left=p1&right=John%20Smith",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["left_name"], "Murray Henry");
        assert_eq!(json["right_name"], "John Smith");

        let rows = json["rows"].as_array().unwrap();
        let ppg = rows.iter().find(|r| r["label"] == "PPG").unwrap();
        assert_eq!(ppg["left"], "15.0");
        assert_eq!(ppg["right"], "12.0");
        assert_eq!(ppg["edge"], "left");

        let apg = rows.iter().find(|r| r["label"] == "APG").unwrap();
        assert_eq!(apg["edge"], "even");
    }

    #[tokio::test]
    async fn test_compare_players_requires_both_sides() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/leagues/nbl/players/compare?left=p1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_compare_players_missing_side() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let app = build_router(setup_test_state(tmp.path()));

        let (status, _) =
            get_json(app, "/api/leagues/nbl/players/compare?left=p1&right=nobody").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
