//! Side-by-side comparison of two season lines.

use super::keys;
use crate::models::{AggregatedStatLine, Comparison, ComparisonRow, Edge, OneDecimal};

#[derive(Clone, Copy)]
enum Better {
    Higher,
    Lower,
}

fn edge(left: f64, right: f64, better: Better) -> Edge {
    if left == right {
        return Edge::Even;
    }
    let left_ahead = match better {
        Better::Higher => left > right,
        Better::Lower => left < right,
    };
    if left_ahead {
        Edge::Left
    } else {
        Edge::Right
    }
}

fn row(label: &str, left: OneDecimal, right: OneDecimal, better: Better) -> ComparisonRow {
    ComparisonRow {
        label: label.to_string(),
        left: left.to_string(),
        right: right.to_string(),
        edge: edge(left.value(), right.value(), better),
    }
}

/// Compare two aggregated lines stat by stat.
///
/// Values are compared as displayed (one decimal), so two averages that
/// render the same are `Even`. Turnovers and fouls favor the lower side.
/// Minutes are only shown when either line recorded any.
pub fn compare(left: &AggregatedStatLine, right: &AggregatedStatLine) -> Comparison {
    let averages = [
        ("PPG", keys::POINTS, Better::Higher),
        ("RPG", keys::REBOUNDS, Better::Higher),
        ("APG", keys::ASSISTS, Better::Higher),
        ("SPG", keys::STEALS, Better::Higher),
        ("BPG", keys::BLOCKS, Better::Higher),
        ("TPG", keys::TURNOVERS, Better::Lower),
        ("FPG", keys::FOULS, Better::Lower),
    ];
    let percentages = [
        ("FG%", keys::FIELD_GOALS),
        ("3P%", keys::THREE_POINTERS),
        ("FT%", keys::FREE_THROWS),
    ];

    let mut rows: Vec<ComparisonRow> = averages
        .iter()
        .map(|&(label, key, better)| row(label, left.average(key), right.average(key), better))
        .collect();

    if left.total_minutes > 0.0 || right.total_minutes > 0.0 {
        rows.push(row(
            "MPG",
            left.minutes_per_game,
            right.minutes_per_game,
            Better::Higher,
        ));
    }

    rows.extend(percentages.iter().map(|&(label, key)| {
        row(label, left.percentage(key), right.percentage(key), Better::Higher)
    }));

    rows.push(ComparisonRow {
        label: "Games".to_string(),
        left: left.games.to_string(),
        right: right.games.to_string(),
        edge: edge(left.games as f64, right.games as f64, Better::Higher),
    });

    Comparison {
        left_name: left.display_name().to_string(),
        right_name: right.display_name().to_string(),
        rows,
    }
}
