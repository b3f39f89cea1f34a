//! Raw per-game stat rows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One player's or one team's stats for a single game.
///
/// Rows arrive with whatever column names the upstream ingestion produced
/// (`spoints`, `points`, `tot_spoints`, ...), so the record keeps the raw
/// JSON object and field lookups go through a [`crate::calculate::StatSchema`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameStatRecord {
    fields: Map<String, Value>,
}

impl GameStatRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build a record from a `serde_json::json!` object. Non-objects give an
    /// empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    /// Raw access to a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Numeric value of a field. Missing, null and non-numeric values are 0;
    /// numeric strings are parsed.
    pub fn number(&self, field: &str) -> f64 {
        self.get(field).map(coerce_number).unwrap_or(0.0)
    }

    /// First present field among `candidates`, as a number.
    pub fn number_of(&self, candidates: &[&str]) -> f64 {
        candidates
            .iter()
            .find(|f| self.has(f))
            .map(|f| self.number(f))
            .unwrap_or(0.0)
    }

    /// First non-empty string among `candidates`.
    pub fn text_of(&self, candidates: &[&str]) -> Option<String> {
        candidates.iter().find_map(|f| match self.get(f)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn player_name(&self) -> Option<String> {
        self.text_of(&["full_name", "name", "player_name"]).or_else(|| {
            let first = self.text_of(&["firstname"]).unwrap_or_default();
            let family = self.text_of(&["familyname"]).unwrap_or_default();
            let joined = format!("{} {}", first, family).trim().to_string();
            (!joined.is_empty()).then_some(joined)
        })
    }

    pub fn player_id(&self) -> Option<String> {
        self.text_of(&["player_id"])
    }

    pub fn team_name(&self) -> Option<String> {
        self.text_of(&["team", "team_name"])
    }

    pub fn opponent(&self) -> Option<String> {
        self.text_of(&["opponent", "opponent_name"])
    }

    pub fn game_id(&self) -> Option<String> {
        self.text_of(&["game_id", "game_key", "numeric_id"])
    }

    pub fn league_id(&self) -> Option<String> {
        self.text_of(&["league_id"])
    }
}

impl From<Value> for GameStatRecord {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}
