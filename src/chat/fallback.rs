//! Local question answering from league rows.
//!
//! Used whenever the remote backend cannot answer. Questions are matched
//! against a fixed list of patterns, checked in order; the first that can be
//! answered from the data wins.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::{ChatReply, NavigationButton};
use crate::calculate::leaders::player_seasons;
use crate::calculate::standings::standings;
use crate::calculate::{keys, GamesRule, StatSchema};
use crate::models::{slugify, GameResult, GameStatRecord};
use crate::reconcile::{team_file_name, team_key, Reconciler};

/// Players kept in a snapshot, best scorers first.
pub const SNAPSHOT_PLAYERS: usize = 20;

/// Most recent games kept in a snapshot.
pub const SNAPSHOT_GAMES: usize = 15;

/// Entries listed in a leaders answer.
const LIST_SIZE: usize = 5;

static WHO_PLAYS_FOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"who does (.+?) play (?:for|on)\b").expect("valid regex"));

static HOW_IS_DOING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"how is (.+?) (?:doing|playing)\b").expect("valid regex"));

/// Season totals for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerTotals {
    pub name: String,
    pub team: String,
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
}

impl PlayerTotals {
    /// Total statistical production.
    pub fn efficiency(&self) -> f64 {
        self.points + self.rebounds + self.assists + self.steals + self.blocks
    }

    fn first_name(&self) -> String {
        self.name
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

/// The slice of a league the local responder looks at.
#[derive(Debug, Clone, Default)]
pub struct LeagueSnapshot {
    pub league_id: String,
    pub league_name: String,
    pub players: Vec<PlayerTotals>,
    pub games: Vec<GameResult>,
}

impl LeagueSnapshot {
    /// Reduce raw rows to the top scorers and the most recent games.
    pub fn build(
        league_id: &str,
        records: &[GameStatRecord],
        games: &[GameResult],
        rule: GamesRule,
        reconciler: &Reconciler,
    ) -> Self {
        let seasons = player_seasons(
            records,
            &StatSchema::player_box_score(),
            rule,
            Some(reconciler),
        );
        let mut players: Vec<PlayerTotals> = seasons
            .into_iter()
            .map(|s| PlayerTotals {
                name: s.line.display_name().to_string(),
                team: s.line.team.clone().unwrap_or_else(|| "Unknown".to_string()),
                points: s.line.total(keys::POINTS),
                rebounds: s.line.total(keys::REBOUNDS),
                assists: s.line.total(keys::ASSISTS),
                steals: s.line.total(keys::STEALS),
                blocks: s.line.total(keys::BLOCKS),
            })
            .collect();
        players.sort_by(|a, b| b.points.total_cmp(&a.points).then_with(|| a.name.cmp(&b.name)));
        players.truncate(SNAPSHOT_PLAYERS);

        let mut games = games.to_vec();
        games.sort_by(|a, b| b.date().cmp(&a.date()));
        games.truncate(SNAPSHOT_GAMES);

        Self {
            league_id: league_id.to_string(),
            league_name: league_id.to_string(),
            players,
            games,
        }
    }

    pub fn with_league_name(mut self, name: impl Into<String>) -> Self {
        self.league_name = name.into();
        self
    }
}

/// Pattern-matching responder.
#[derive(Debug, Clone, Default)]
pub struct LocalResponder {
    reconciler: Reconciler,
}

impl LocalResponder {
    pub fn new(reconciler: Reconciler) -> Self {
        Self { reconciler }
    }

    /// Answer a question from the snapshot. Always produces a reply.
    pub fn answer(&self, question: &str, snapshot: &LeagueSnapshot) -> ChatReply {
        let q = question.to_lowercase();

        if q.contains("who does") && (q.contains("play for") || q.contains("play on")) {
            if let Some(reply) = self.team_of_player(&q, snapshot) {
                return reply;
            }
        }

        if q.contains("how is") && (q.contains("doing") || q.contains("playing")) {
            if let Some(reply) = self.player_form(&q, snapshot) {
                return reply;
            }
        }

        if q.contains("best team") || q.contains("top team") {
            if let Some(reply) = best_team(snapshot) {
                return reply;
            }
        }

        if q.contains("recent games") || q.contains("results") {
            if let Some(reply) = recent_results(snapshot) {
                return reply;
            }
        }

        if q.contains("efficient") || q.contains("best player") || q.contains("most productive")
        {
            if let Some(reply) = most_efficient(snapshot) {
                return reply;
            }
        }

        if q.contains("rebound") || q.contains("board") {
            if let Some(reply) = rebounding_leaders(snapshot) {
                return reply;
            }
        }

        if ["scorer", "scoring", "points", "top"]
            .iter()
            .any(|w| q.contains(w))
        {
            if let Some(reply) = scoring_leaders(snapshot) {
                return reply;
            }
        }

        if let Some(reply) = league_overview(snapshot) {
            return reply;
        }

        ChatReply::local(format!(
            "I can help you explore {} data! Try asking about specific players, team performance, or statistical leaders.",
            snapshot.league_name
        ))
    }

    fn find_player<'a>(
        &self,
        search: &str,
        snapshot: &'a LeagueSnapshot,
    ) -> Option<&'a PlayerTotals> {
        let search = search.trim();
        if search.is_empty() {
            return None;
        }

        let search_first = search.split_whitespace().next().unwrap_or_default();
        snapshot.players.iter().find(|p| {
            let first = p.first_name();
            p.name.to_lowercase().contains(search)
                || search.split_whitespace().any(|w| w == first)
                || first == search_first
                || self.reconciler.is_likely_same(&p.name, search)
        })
    }

    fn team_of_player(&self, q: &str, snapshot: &LeagueSnapshot) -> Option<ChatReply> {
        let search = WHO_PLAYS_FOR.captures(q)?.get(1)?.as_str().trim().to_string();

        match self.find_player(&search, snapshot) {
            Some(player) => Some(
                ChatReply::local(format!("{} plays for {}.", player.name, player.team))
                    .with_suggestions(vec![
                        format!("How is {} doing?", player.name),
                        format!("Who are {}'s top players?", player.team),
                    ])
                    .with_buttons(vec![
                        player_button(snapshot, player),
                        team_button(snapshot, &player.team),
                    ]),
            ),
            None => {
                let listing = if snapshot.players.is_empty() {
                    "No player data available".to_string()
                } else {
                    snapshot
                        .players
                        .iter()
                        .take(LIST_SIZE)
                        .map(|p| format!("• {} ({})", p.name, p.team))
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                Some(ChatReply::local(format!(
                    "I couldn't find a player named \"{}\" in {}. Try asking about one of these players:\n\n{}",
                    search, snapshot.league_name, listing
                )))
            }
        }
    }

    fn player_form(&self, q: &str, snapshot: &LeagueSnapshot) -> Option<ChatReply> {
        let search = HOW_IS_DOING.captures(q)?.get(1)?.as_str().trim().to_string();
        let player = self.find_player(&search, snapshot)?;

        let note = if player.points >= 30.0 {
            "Strong scorer who can put up big numbers!"
        } else if player.rebounds >= 15.0 {
            "Solid presence in the paint with good rebounding!"
        } else if player.assists >= 10.0 {
            "Great court vision and playmaking ability!"
        } else {
            "Well-rounded contributor on both ends!"
        };

        Some(
            ChatReply::local(format!(
                "{} is having a solid season with {}!\n\nSeason totals: {:.0} pts, {:.0} reb, {:.0} ast, {:.0} stl, {:.0} blk\n\n{}",
                player.name,
                player.team,
                player.points,
                player.rebounds,
                player.assists,
                player.steals,
                player.blocks,
                note
            ))
            .with_suggestions(vec![
                "Who are the most efficient players?".to_string(),
                format!("Who does {} play next?", player.team),
            ])
            .with_buttons(vec![player_button(snapshot, player)]),
        )
    }
}

fn player_button(snapshot: &LeagueSnapshot, player: &PlayerTotals) -> NavigationButton {
    NavigationButton::new(
        format!("View {}", player.name),
        format!(
            "/api/leagues/{}/players/{}/summary",
            snapshot.league_id,
            slugify(&player.name)
        ),
    )
}

fn team_button(snapshot: &LeagueSnapshot, team: &str) -> NavigationButton {
    NavigationButton::new(
        format!("View {}", team),
        format!(
            "/api/leagues/{}/teams/{}/summary",
            snapshot.league_id,
            team_file_name(team)
        ),
    )
}

fn leaders_button(snapshot: &LeagueSnapshot) -> NavigationButton {
    NavigationButton::new(
        "League leaders",
        format!("/api/leagues/{}/leaders", snapshot.league_id),
    )
}

fn best_team(snapshot: &LeagueSnapshot) -> Option<ChatReply> {
    let table = standings(&snapshot.league_id, &snapshot.games);
    let top = table.leader()?;

    Some(
        ChatReply::local(format!(
            "{} is the top team in {}.\n\nRecord: {}-{} ({}% win rate)\nAveraging {} points per game\nAllowing {} points per game",
            top.team,
            snapshot.league_name,
            top.wins,
            top.losses,
            top.win_pct,
            top.points_for_per_game,
            top.points_against_per_game
        ))
        .with_suggestions(vec![
            format!("Who are {}'s top players?", top.team),
            "Show me recent games".to_string(),
        ])
        .with_buttons(vec![
            team_button(snapshot, &top.team),
            NavigationButton::new(
                "Standings",
                format!("/api/leagues/{}/standings", snapshot.league_id),
            ),
        ]),
    )
}

fn recent_results(snapshot: &LeagueSnapshot) -> Option<ChatReply> {
    let played: Vec<(&GameResult, u32, u32)> = snapshot
        .games
        .iter()
        .filter_map(|g| g.final_score().map(|(h, a)| (g, h, a)))
        .take(LIST_SIZE)
        .collect();
    let (latest, _, _) = *played.first()?;

    let lines = played
        .iter()
        .map(|(g, h, a)| {
            let date = g.date().map(|d| d.format("%Y-%m-%d").to_string());
            format!(
                "• {}: {} {} - {} {}",
                date.as_deref().unwrap_or("TBD"),
                g.home_team,
                h,
                a,
                g.away_team
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut buttons = Vec::new();
    if let Some(slug) = latest.slug() {
        buttons.push(NavigationButton::new(
            format!("{} vs {}", latest.home_team, latest.away_team),
            format!("/api/leagues/{}/games/{}", snapshot.league_id, slug),
        ));
    }
    buttons.push(NavigationButton::new(
        "Standings",
        format!("/api/leagues/{}/standings", snapshot.league_id),
    ));

    Some(
        ChatReply::local(format!(
            "Recent results in {}:\n\n{}",
            snapshot.league_name, lines
        ))
        .with_suggestions(vec![
            "Who is the best team?".to_string(),
            "Who is the top scorer?".to_string(),
        ])
        .with_buttons(buttons),
    )
}

fn ranked_by<F>(snapshot: &LeagueSnapshot, value: F) -> Vec<(&PlayerTotals, f64)>
where
    F: Fn(&PlayerTotals) -> f64,
{
    let mut ranked: Vec<(&PlayerTotals, f64)> =
        snapshot.players.iter().map(|p| (p, value(p))).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(LIST_SIZE);
    ranked
}

fn numbered(ranked: &[(&PlayerTotals, f64)], unit: &str) -> String {
    ranked
        .iter()
        .enumerate()
        .map(|(i, (p, v))| format!("{}. {} ({}) - {:.0} {}", i + 1, p.name, p.team, v, unit))
        .collect::<Vec<_>>()
        .join("\n")
}

fn most_efficient(snapshot: &LeagueSnapshot) -> Option<ChatReply> {
    let ranked = ranked_by(snapshot, PlayerTotals::efficiency);
    let (top, top_value) = *ranked.first()?;

    Some(
        ChatReply::local(format!(
            "Most Efficient Players in {}:\n(Based on total statistical production)\n\n{}\n\n{} leads with {:.0} total production.",
            snapshot.league_name,
            numbered(&ranked, "total production"),
            top.name,
            top_value
        ))
        .with_suggestions(vec![
            format!("How is {} doing?", top.name),
            "Who leads in rebounds?".to_string(),
        ])
        .with_buttons(vec![leaders_button(snapshot)]),
    )
}

fn rebounding_leaders(snapshot: &LeagueSnapshot) -> Option<ChatReply> {
    let ranked = ranked_by(snapshot, |p| p.rebounds);
    let (top, _) = *ranked.first()?;

    Some(
        ChatReply::local(format!(
            "Rebounding Leaders in {}:\n\n{}",
            snapshot.league_name,
            numbered(&ranked, "rebounds")
        ))
        .with_suggestions(vec![
            format!("How is {} doing?", top.name),
            "Who are the most efficient players?".to_string(),
        ])
        .with_buttons(vec![leaders_button(snapshot)]),
    )
}

fn scoring_leaders(snapshot: &LeagueSnapshot) -> Option<ChatReply> {
    let ranked = ranked_by(snapshot, |p| p.points);
    let (top, _) = *ranked.first()?;

    Some(
        ChatReply::local(format!(
            "Scoring Leaders in {}:\n\n{}",
            snapshot.league_name,
            numbered(&ranked, "points")
        ))
        .with_suggestions(vec![
            format!("How is {} doing?", top.name),
            "Who is the best team?".to_string(),
        ])
        .with_buttons(vec![leaders_button(snapshot)]),
    )
}

fn league_overview(snapshot: &LeagueSnapshot) -> Option<ChatReply> {
    let top = snapshot.players.first()?;
    let teams: HashSet<String> = snapshot.players.iter().map(|p| team_key(&p.team)).collect();
    let games = if snapshot.games.is_empty() {
        "Several".to_string()
    } else {
        snapshot.games.len().to_string()
    };

    Some(
        ChatReply::local(format!(
            "Here's what's happening in {}:\n\nLeague Leaders:\n• Top Scorer: {} ({}) - {:.0} points\n• Games Played: {} recent games\n• Teams Competing: {} active teams",
            snapshot.league_name,
            top.name,
            top.team,
            top.points,
            games,
            teams.len()
        ))
        .with_suggestions(vec![
            "How is [Player Name] doing?".to_string(),
            "Who is the best team?".to_string(),
            "Who are the most efficient players?".to_string(),
        ]),
    )
}
