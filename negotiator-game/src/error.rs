use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::preparation::SmartGoalKey;

/// Player inputs the controller refuses, and export failures.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("team name must be 1..={max} characters after trimming (got {len})")]
    InvalidTeamName { len: usize, max: usize },
    #[error("preparation incomplete; SMART goals still missing: {}", format_keys(.missing))]
    PreparationIncomplete { missing: Vec<SmartGoalKey> },
    #[error("unknown cultural adjustment '{0}'")]
    UnknownAdjustment(String),
    #[error("results can only be exported from the debrief")]
    ReportUnavailable,
    #[error("failed to serialize results: {0}")]
    Export(#[from] serde_json::Error),
}

/// Failure to produce a catalog or configuration from a data source.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn format_keys(keys: &[SmartGoalKey]) -> String {
    keys.iter()
        .map(|key| key.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_goals_are_listed_by_id() {
        let err = GameError::PreparationIncomplete {
            missing: vec![SmartGoalKey::Measurable, SmartGoalKey::TimeBound],
        };
        assert_eq!(
            err.to_string(),
            "preparation incomplete; SMART goals still missing: measurable, timeBound"
        );
    }
}
