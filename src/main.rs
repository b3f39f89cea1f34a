use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use league_stats::api::{build_router, state::AppState};
use league_stats::calculate::compare::compare;
use league_stats::calculate::leaders::{
    find_player, league_leaders, player_seasons, team_roster, LeadersOptions,
};
use league_stats::calculate::preview::game_preview;
use league_stats::calculate::standings::standings;
use league_stats::calculate::trends::{team_trend, team_trends};
use league_stats::calculate::{format_minutes, keys, team_season, StatSchema};
use league_stats::chat::{ChatBackend, ChatRequest, ChatService, HttpChatBackend};
use league_stats::config::AppConfig;
use league_stats::models::{
    find_game, AggregatedStatLine, Comparison, Edge, PreviewSide, TeamTrend,
};
use league_stats::reconcile::Reconciler;
use league_stats::storage::{LeagueStore, StorageConfig};

#[derive(Parser)]
#[command(name = "league-stats")]
#[command(about = "Basketball league stats, name reconciliation and league chat")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show a player's season line
    Player {
        #[arg(long)]
        league: String,

        /// Player id, name or slug
        player: String,
    },

    /// Show a team's season line and roster
    Team {
        #[arg(long)]
        league: String,

        team: String,
    },

    /// Compare two players side by side
    ComparePlayers {
        #[arg(long)]
        league: String,

        left: String,
        right: String,
    },

    /// Compare two teams side by side
    CompareTeams {
        #[arg(long)]
        league: String,

        left: String,
        right: String,
    },

    /// Show league leaderboards
    Leaders {
        #[arg(long)]
        league: String,

        /// Entries per board (defaults to the config file)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show the league table
    Standings {
        #[arg(long)]
        league: String,
    },

    /// Show scoring trends for one team, or every team
    Trends {
        #[arg(long)]
        league: String,

        team: Option<String>,
    },

    /// Preview both sides of a game
    Preview {
        #[arg(long)]
        league: String,

        /// Game slug (`home-vs-away-YYYY-MM-DD`) or game id
        game: String,
    },

    /// Explain whether two names would be treated as the same entity
    Match { left: String, right: String },

    /// Ask the league chat a question
    Ask {
        #[arg(long)]
        league: String,

        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting league-stats v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load_or_default(Path::new(&cli.config))?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(data_dir);
    }

    let store = LeagueStore::new(StorageConfig::new(config.data_dir.clone()));
    let reconciler = Reconciler::from_config(&config.matching);
    let rule = config.aggregation.games_rule;
    let merge = config.aggregation.reconcile_names.then_some(&reconciler);

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let state = AppState::from_config(config)?;
            let app = build_router(state);

            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("API: http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Player { league, player } => {
            let records = store.player_stats(&league).await;
            let seasons = player_seasons(&records, &StatSchema::player_full(), rule, merge);

            match find_player(&seasons, &player, &reconciler) {
                Some(season) => {
                    println!("\n=== {} ===", season.line.display_name());
                    print_line(&season.line);
                }
                None => println!("No data for player '{}' in league '{}'", player, league),
            }
        }
        Commands::Team { league, team } => {
            let (team_rows, player_rows, games) = tokio::join!(
                store.team_stats(&league),
                store.player_stats(&league),
                store.games(&league)
            );

            let Some(line) = team_season(&team_rows, &team, rule) else {
                println!("No data for team '{}' in league '{}'", team, league);
                return Ok(());
            };

            println!("\n=== {} ===", line.display_name());
            let table = standings(&league, &games);
            if let Some(record) = table.get_team(line.display_name()) {
                println!(
                    "Record:           {}-{} ({}%)",
                    record.wins, record.losses, record.win_pct
                );
            }
            print_line(&line);

            let roster = team_roster(&player_rows, &team, rule, merge);
            if !roster.is_empty() {
                println!("\n--- Roster ---");
                for player in &roster {
                    println!(
                        "{:<28} {:>3} GP  {:>5} PPG  {:>5} RPG  {:>5} APG",
                        player.display_name(),
                        player.games,
                        player.average(keys::POINTS).to_string(),
                        player.average(keys::REBOUNDS).to_string(),
                        player.average(keys::ASSISTS).to_string(),
                    );
                }
            }
        }
        Commands::ComparePlayers { league, left, right } => {
            let records = store.player_stats(&league).await;
            let seasons = player_seasons(&records, &StatSchema::player_full(), rule, merge);

            let (Some(l), Some(r)) = (
                find_player(&seasons, &left, &reconciler),
                find_player(&seasons, &right, &reconciler),
            ) else {
                bail!("Both players must have data in league '{}'", league);
            };
            print_comparison(&compare(&l.line, &r.line));
        }
        Commands::CompareTeams { league, left, right } => {
            let rows = store.team_stats(&league).await;
            let (Some(l), Some(r)) = (
                team_season(&rows, &left, rule),
                team_season(&rows, &right, rule),
            ) else {
                bail!("Both teams must have data in league '{}'", league);
            };
            print_comparison(&compare(&l, &r));
        }
        Commands::Leaders { league, limit } => {
            let records = store.player_stats(&league).await;
            if records.is_empty() {
                println!("No player stats for league '{}'", league);
                return Ok(());
            }

            let options = LeadersOptions {
                limit: limit.unwrap_or(config.aggregation.leaderboard_size),
                rule,
                reconcile_names: config.aggregation.reconcile_names,
            };
            let leaders = league_leaders(&league, &records, &options, &reconciler);

            for board in &leaders.boards {
                println!("\n=== {} ===", board.category);
                for entry in &board.entries {
                    println!(
                        "{:>2}. {:<28} {:<20} {}",
                        entry.rank,
                        entry.name,
                        entry.team.as_deref().unwrap_or(""),
                        entry.display_value
                    );
                }
            }
        }
        Commands::Standings { league } => {
            let games = store.games(&league).await;
            let table = standings(&league, &games);
            if table.teams.is_empty() {
                println!("No completed games for league '{}'", league);
                return Ok(());
            }

            println!("\n=== Standings: {} ===", league);
            for (i, team) in table.teams.iter().enumerate() {
                println!(
                    "{:>2}. {:<28} {:>3}-{:<3} {:>6}%  {:>+5}",
                    i + 1,
                    team.team,
                    team.wins,
                    team.losses,
                    team.win_pct.to_string(),
                    team.point_differential()
                );
            }
        }
        Commands::Trends { league, team } => {
            let records = store.player_stats(&league).await;
            let trends: Vec<TeamTrend> = match &team {
                Some(team) => team_trend(&records, team).into_iter().collect(),
                None => team_trends(&records),
            };
            if trends.is_empty() {
                println!("No dated team games for league '{}'", league);
                return Ok(());
            }

            for trend in &trends {
                print_trend(trend);
            }
        }
        Commands::Preview { league, game } => {
            let (games, team_rows, player_rows) = tokio::join!(
                store.games(&league),
                store.team_stats(&league),
                store.player_stats(&league)
            );

            let Some(found) = find_game(&games, &game) else {
                bail!("Game '{}' not found in league '{}'", game, league);
            };

            let preview =
                game_preview(&league, found, &team_rows, &player_rows, &games, rule, merge);
            println!(
                "
=== {} vs {} ({}) ===",
                preview.home.team,
                preview.away.team,
                found.game_date.as_deref().unwrap_or("date TBC")
            );
            print_preview_side(&preview.home);
            print_preview_side(&preview.away);
        }
        Commands::Match { left, right } => {
            let reason = reconciler.explain(&left, &right);
            println!("{}", serde_json::to_string_pretty(&reason)?);
            let verdict = if reconciler.is_same_entity(&left, &right) {
                "are merged as one entity"
            } else if reason.is_match() {
                "resolve to each other in lookups but are not merged"
            } else {
                "do not match"
            };
            println!("\n'{}' and '{}' {}", left, right, verdict);
        }
        Commands::Ask { league, question } => {
            let backend = HttpChatBackend::from_config(&config.chat)?
                .map(|b| Arc::new(b) as Arc<dyn ChatBackend>);
            let chat =
                ChatService::new(backend, store, reconciler, rule).with_chat_config(&config.chat);

            let reply = chat.answer(&ChatRequest::new(question, league)).await;
            println!("{}", reply.content);
            if !reply.suggestions.is_empty() {
                println!("\nTry asking:");
                for suggestion in &reply.suggestions {
                    println!("  - {}", suggestion);
                }
            }
            for button in &reply.buttons {
                println!("[{}] {}", button.label, button.path);
            }
        }
    }

    Ok(())
}

fn print_line(line: &AggregatedStatLine) {
    if let Some(team) = &line.team {
        println!("Team:             {}", team);
    }
    println!("Games:            {}", line.games);
    if line.total_minutes > 0.0 {
        println!(
            "Minutes:          {}",
            format_minutes(line.total_minutes / line.games.max(1) as f64)
        );
    }
    for (label, key) in [
        ("Points", keys::POINTS),
        ("Rebounds", keys::REBOUNDS),
        ("Assists", keys::ASSISTS),
        ("Steals", keys::STEALS),
        ("Blocks", keys::BLOCKS),
        ("Turnovers", keys::TURNOVERS),
    ] {
        println!(
            "{:<17} {} ({} total)",
            format!("{}:", label),
            line.average(key),
            line.total(key)
        );
    }
    for (label, key) in [
        ("FG%", keys::FIELD_GOALS),
        ("3P%", keys::THREE_POINTERS),
        ("FT%", keys::FREE_THROWS),
    ] {
        let split = line.split(key);
        println!(
            "{:<17} {} ({}/{})",
            format!("{}:", label),
            split.percentage,
            split.made,
            split.attempted
        );
    }
    for (key, value) in &line.rates {
        println!("{:<17} {}", format!("{}:", key), value);
    }
}

fn print_trend(trend: &TeamTrend) {
    println!(
        "\n=== {} ===\nAverage: {} PPG over {} games, trending {:?} ({}%)",
        trend.team,
        trend.average_points,
        trend.games.len(),
        trend.direction,
        trend.change_pct
    );
    for game in &trend.games {
        println!(
            "{}  {:<12} {:>5} pts {:>5} reb {:>5} ast",
            game.date, game.game_id, game.points, game.rebounds, game.assists
        );
    }
    let form: Vec<String> = trend.recent_form.iter().map(|p| p.to_string()).collect();
    println!("Recent form: {}", form.join(", "));
}

fn print_preview_side(side: &PreviewSide) {
    println!("\n--- {} ---", side.team);
    if let Some(record) = &side.record {
        println!("Record: {}-{}", record.wins, record.losses);
    }
    println!("Last {} games:", side.recent_games.len());
    for game in &side.recent_games {
        println!(
            "  {:<12} vs {:<20} {} pts",
            game.game_id.as_deref().unwrap_or("-"),
            game.opponent.as_deref().unwrap_or("-"),
            game.points
        );
    }
    println!("Top players:");
    for player in &side.top_players {
        println!(
            "  {:<28} {:>5} PPG  {:>5} RPG  {:>5} APG",
            player.name,
            player.points_per_game.to_string(),
            player.rebounds_per_game.to_string(),
            player.assists_per_game.to_string()
        );
    }
}

fn print_comparison(comparison: &Comparison) {
    println!(
        "\n{:<8} {:>20} {:>20}",
        "", comparison.left_name, comparison.right_name
    );
    for row in &comparison.rows {
        let marker = match row.edge {
            Edge::Left => "<",
            Edge::Right => ">",
            Edge::Even => "=",
        };
        println!("{:<8} {:>20} {:>20}  {}", row.label, row.left, row.right, marker);
    }
}
