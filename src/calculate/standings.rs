//! League table from game results.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{GameResult, Standings, TeamRecord};
use crate::reconcile::{normalize_team_name, team_key};

#[derive(Default)]
struct Tally {
    name: String,
    wins: u32,
    losses: u32,
    points_for: u32,
    points_against: u32,
}

/// Compute standings from completed games.
///
/// Games without a final score are ignored. The home side wins only with a
/// strictly greater score, so a tied game is a home loss. Teams are merged on
/// their normalized name and ordered by win percentage, then point
/// differential, then name.
pub fn standings(league_id: &str, games: &[GameResult]) -> Standings {
    let mut tallies: HashMap<String, Tally> = HashMap::new();

    let mut entry = |team: &str| -> Option<String> {
        let key = team_key(team);
        if key.is_empty() {
            return None;
        }
        tallies.entry(key.clone()).or_insert_with(|| Tally {
            name: normalize_team_name(team),
            ..Default::default()
        });
        Some(key)
    };

    let mut results = Vec::new();
    for game in games {
        let Some((home_score, away_score)) = game.final_score() else {
            continue;
        };
        let (Some(home), Some(away)) = (entry(&game.home_team), entry(&game.away_team)) else {
            continue;
        };
        results.push((home, away, home_score, away_score));
    }

    for (home, away, home_score, away_score) in results {
        let home_won = home_score > away_score;

        if let Some(t) = tallies.get_mut(&home) {
            t.points_for += home_score;
            t.points_against += away_score;
            if home_won {
                t.wins += 1;
            } else {
                t.losses += 1;
            }
        }
        if let Some(t) = tallies.get_mut(&away) {
            t.points_for += away_score;
            t.points_against += home_score;
            if home_won {
                t.losses += 1;
            } else {
                t.wins += 1;
            }
        }
    }

    let mut teams: Vec<TeamRecord> = tallies
        .into_values()
        .filter(|t| t.wins + t.losses > 0)
        .map(|t| TeamRecord::new(t.name, t.wins, t.losses, t.points_for, t.points_against))
        .collect();

    teams.sort_by(|a, b| {
        b.win_fraction()
            .partial_cmp(&a.win_fraction())
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.point_differential().cmp(&a.point_differential()))
            .then_with(|| a.team.cmp(&b.team))
    });

    Standings::new(league_id, teams)
}
