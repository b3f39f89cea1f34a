//! Name reconciliation.
//!
//! Player and team identifiers upstream are unreliable, so records that
//! refer to the same person or side are merged by name. This is a heuristic:
//! a missed match leaves two entities apart, a false match merges two
//! namesakes. Both are accepted.

pub mod names;
pub mod teams;

use serde::Serialize;
use tracing::debug;

use crate::config::MatchingConfig;

pub use names::{
    close_match, most_complete_name, name_key, names_match, normalize_name, slug_to_name,
    MatchTolerance, DEFAULT_SIMILARITY_THRESHOLD,
};
pub use teams::{normalize_team_name, team_file_name, team_key, teams_match};

/// Why two names were judged to be the same entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum MatchReason {
    Exact,
    CloseSpelling { mismatches: usize },
    Initials,
    Similarity { score: f64 },
    NoMatch { score: f64 },
}

impl MatchReason {
    pub fn is_match(&self) -> bool {
        !matches!(self, MatchReason::NoMatch { .. })
    }
}

/// Layered name matcher with configurable thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconciler {
    pub tolerance: MatchTolerance,
    pub similarity_threshold: f64,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            tolerance: MatchTolerance::default(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl Reconciler {
    pub fn new(tolerance: MatchTolerance, similarity_threshold: f64) -> Self {
        Self {
            tolerance,
            similarity_threshold,
        }
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(
            MatchTolerance {
                max_length_diff: config.max_length_diff,
                min_length: config.min_length,
                max_mismatches: config.max_mismatches,
            },
            config.similarity_threshold,
        )
    }

    /// Explain how two names compare.
    ///
    /// `Similarity` is only accepted by [`Reconciler::is_likely_same`];
    /// merging goes through [`Reconciler::is_same_entity`].
    pub fn explain(&self, a: &str, b: &str) -> MatchReason {
        if a.trim().to_lowercase() == b.trim().to_lowercase() {
            return MatchReason::Exact;
        }

        let (ka, kb) = (name_key(a), name_key(b));
        if ka.is_empty() || kb.is_empty() {
            return MatchReason::NoMatch { score: 0.0 };
        }

        if let Some(mismatches) = names::positional_mismatches(a, b, &self.tolerance) {
            if mismatches <= self.tolerance.max_mismatches {
                return MatchReason::CloseSpelling { mismatches };
            }
        }

        if ka == kb {
            return MatchReason::Exact;
        }
        if names::initials_match(&ka, &kb) {
            return MatchReason::Initials;
        }

        let score = strsim::jaro_winkler(&ka, &kb);
        if score >= self.similarity_threshold {
            MatchReason::Similarity { score }
        } else {
            MatchReason::NoMatch { score }
        }
    }

    /// Whether two names denote the same entity: exact, close spelling or
    /// initials. Names with no letters only match themselves.
    pub fn is_same_entity(&self, a: &str, b: &str) -> bool {
        if a.trim().to_lowercase() == b.trim().to_lowercase() {
            return !a.trim().is_empty();
        }

        let (ka, kb) = (name_key(a), name_key(b));
        if ka.is_empty() || kb.is_empty() {
            return false;
        }

        close_match(a, b, &self.tolerance) || ka == kb || names::initials_match(&ka, &kb)
    }

    /// Looser check for resolving a user-typed name against known names.
    /// Adds Jaro-Winkler similarity on top of [`Reconciler::is_same_entity`].
    pub fn is_likely_same(&self, a: &str, b: &str) -> bool {
        self.is_same_entity(a, b) || names_match(a, b, self.similarity_threshold)
    }

    /// Cluster items whose names reconcile.
    ///
    /// Items are only merged within the same partition (for players, the
    /// team key), so namesakes on different teams stay apart. Items without
    /// a name end up together in an "Unknown" group. Group order follows
    /// first appearance.
    pub fn group_by_entity<T, N, P>(&self, items: Vec<T>, name_of: N, partition_of: P) -> Vec<EntityGroup<T>>
    where
        N: Fn(&T) -> Option<String>,
        P: Fn(&T) -> String,
    {
        let mut groups: Vec<EntityGroup<T>> = Vec::new();

        for item in items {
            let partition = partition_of(&item);
            let name = name_of(&item);

            let existing = groups.iter_mut().find(|g| {
                g.partition == partition
                    && match &name {
                        Some(n) => g.names.iter().any(|known| self.is_same_entity(known, n)),
                        None => g.names.is_empty(),
                    }
            });

            match existing {
                Some(group) => {
                    if let Some(n) = name {
                        if !group.names.contains(&n) {
                            debug!("Merging name variant '{}' into '{}'", n, group.canonical_name);
                            group.names.push(n);
                            group.refresh_canonical();
                        }
                    }
                    group.members.push(item);
                }
                None => {
                    let mut group = EntityGroup {
                        canonical_name: String::new(),
                        partition,
                        names: name.into_iter().collect(),
                        members: vec![item],
                    };
                    group.refresh_canonical();
                    groups.push(group);
                }
            }
        }

        groups
    }
}

/// Items judged to be the same entity.
#[derive(Debug, Clone)]
pub struct EntityGroup<T> {
    /// Most complete spelling among `names`
    pub canonical_name: String,
    pub partition: String,
    /// Every distinct spelling seen
    pub names: Vec<String>,
    pub members: Vec<T>,
}

impl<T> EntityGroup<T> {
    fn refresh_canonical(&mut self) {
        self.canonical_name =
            most_complete_name(&self.names).unwrap_or_else(|| "Unknown".to_string());
    }
}
