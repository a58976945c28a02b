//! Tunable timing and scoring values for a playthrough.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("default team name must be 1..={max} characters (got {len})")]
    DefaultTeamName { len: usize, max: usize },
    #[error("game config JSON is invalid: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub default_team_name: String,
    pub initial_countdown_secs: u32,
    pub restart_countdown_secs: u32,
    pub countdown_tick_ms: u64,
    pub stage_feedback_delay_ms: u64,
    pub debrief_transition_delay_ms: u64,
    pub smart_goal_points: u32,
    pub stage_completion_bonus: u32,
    pub debrief_bonus: u32,
    /// Goal text must be strictly longer than this many characters.
    pub smart_goal_min_chars: usize,
    pub team_name_max_chars: usize,
    pub smart_goal_preview_chars: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            default_team_name: "Synapse Team Alpha".to_string(),
            initial_countdown_secs: 1800,
            restart_countdown_secs: 5400,
            countdown_tick_ms: 1000,
            stage_feedback_delay_ms: 3000,
            debrief_transition_delay_ms: 2000,
            smart_goal_points: 50,
            stage_completion_bonus: 100,
            debrief_bonus: 200,
            smart_goal_min_chars: 20,
            team_name_max_chars: 50,
            smart_goal_preview_chars: 50,
        }
    }
}

impl GameConfig {
    /// Parse and validate a configuration; absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the configuration for values that would stall or break the flow.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("initial_countdown_secs", u64::from(self.initial_countdown_secs)),
            ("restart_countdown_secs", u64::from(self.restart_countdown_secs)),
            ("countdown_tick_ms", self.countdown_tick_ms),
            ("stage_feedback_delay_ms", self.stage_feedback_delay_ms),
            ("debrief_transition_delay_ms", self.debrief_transition_delay_ms),
            (
                "team_name_max_chars",
                u64::try_from(self.team_name_max_chars).unwrap_or(u64::MAX),
            ),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
        }
        let len = self.default_team_name.trim().chars().count();
        if len == 0 || len > self.team_name_max_chars {
            return Err(ConfigError::DefaultTeamName {
                len,
                max: self.team_name_max_chars,
            });
        }
        Ok(())
    }
}
