pub mod chat;
pub mod health;
pub mod league;
pub mod players;
pub mod teams;

use serde::Deserialize;

use super::state::AppState;
use super::ApiError;
use crate::reconcile::Reconciler;

/// `?left=&right=` for comparison endpoints.
#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub left: Option<String>,
    pub right: Option<String>,
}

impl CompareParams {
    /// Both sides, trimmed. Either one missing or blank is a bad request.
    pub fn sides(&self) -> Result<(String, String), ApiError> {
        let side = |value: &Option<String>, which: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ApiError::BadRequest(format!("'{}' is required", which)))
        };
        Ok((side(&self.left, "left")?, side(&self.right, "right")?))
    }
}

/// Reconciler to merge unidentified player rows with, if enabled.
pub(crate) fn merge_with(state: &AppState) -> Option<&Reconciler> {
    state
        .config
        .aggregation
        .reconcile_names
        .then_some(&state.reconciler)
}

/// Team path segments use underscores for spaces.
pub(crate) fn team_from_path(team: &str) -> String {
    team.replace('_', " ")
}
