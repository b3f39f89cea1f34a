//! Aggregated season lines.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value rounded to one decimal place.
///
/// Serializes and displays with exactly one decimal (`"38.9"`, `"0.0"`), the
/// form every per-game and percentage figure is shown in.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct OneDecimal(f64);

impl OneDecimal {
    pub const ZERO: OneDecimal = OneDecimal(0.0);

    pub fn new(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        let rounded = (value * 10.0).round() / 10.0;
        // Avoid "-0.0".
        if rounded == 0.0 {
            Self::ZERO
        } else {
            Self(rounded)
        }
    }

    /// `numerator / denominator`, or zero when the denominator is zero.
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            Self::ZERO
        } else {
            Self::new(numerator / denominator)
        }
    }

    /// `made / attempted * 100`, or zero when nothing was attempted.
    pub fn percentage(made: f64, attempted: f64) -> Self {
        if attempted == 0.0 {
            Self::ZERO
        } else {
            Self::new(made / attempted * 100.0)
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for OneDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

impl Serialize for OneDecimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OneDecimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(OneDecimal::new(n)),
            Raw::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(OneDecimal::new)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Made/attempted totals for one shooting category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShootingSplit {
    pub made: f64,
    pub attempted: f64,
    pub percentage: OneDecimal,
}

impl ShootingSplit {
    pub fn new(made: f64, attempted: f64) -> Self {
        Self {
            made,
            attempted,
            percentage: OneDecimal::percentage(made, attempted),
        }
    }
}

/// Season summary for one player or team, derived from per-game rows.
///
/// Built fresh from query results and never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedStatLine {
    /// Display name of the entity
    pub name: Option<String>,

    /// Team of the entity (players only)
    pub team: Option<String>,

    /// Number of qualifying games
    pub games: u32,

    /// Season totals per counting stat
    pub totals: BTreeMap<String, f64>,

    /// Per-game averages per counting stat
    pub averages: BTreeMap<String, OneDecimal>,

    /// Shooting splits per category
    pub shooting: BTreeMap<String, ShootingSplit>,

    /// Per-game rate stats averaged over games
    pub rates: BTreeMap<String, OneDecimal>,

    /// Total minutes played
    pub total_minutes: f64,

    /// Minutes per game
    pub minutes_per_game: OneDecimal,
}

impl AggregatedStatLine {
    pub fn total(&self, key: &str) -> f64 {
        self.totals.get(key).copied().unwrap_or(0.0)
    }

    pub fn average(&self, key: &str) -> OneDecimal {
        self.averages.get(key).copied().unwrap_or_default()
    }

    pub fn percentage(&self, key: &str) -> OneDecimal {
        self.shooting
            .get(key)
            .map(|s| s.percentage)
            .unwrap_or_default()
    }

    pub fn split(&self, key: &str) -> ShootingSplit {
        self.shooting.get(key).copied().unwrap_or_default()
    }

    pub fn rate(&self, key: &str) -> OneDecimal {
        self.rates.get(key).copied().unwrap_or_default()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}
