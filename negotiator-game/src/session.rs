use serde::{Deserialize, Serialize};

use crate::clock::{Clock, history_timestamp};
use crate::config::GameConfig;
use crate::history::{ChoiceLog, HistoryEntry, HistoryLog};
use crate::phase::Phase;

/// Everything a single playthrough accumulates.
///
/// Owned by [`crate::PhaseController`]; the presentation layer only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,
    pub team_name: String,
    pub score: u32,
    pub seconds_remaining: u32,
    pub history: HistoryLog,
    pub choices: ChoiceLog,
    /// Points granted outside the history, i.e. the debrief-entry bonus.
    pub bonus_points: u32,
}

impl SessionState {
    #[must_use]
    pub fn new(cfg: &GameConfig) -> Self {
        Self {
            phase: Phase::Briefing,
            team_name: cfg.default_team_name.clone(),
            score: 0,
            seconds_remaining: cfg.initial_countdown_secs,
            history: HistoryLog::default(),
            choices: ChoiceLog::default(),
            bonus_points: 0,
        }
    }

    /// Append a history entry stamped with the current phase and time; positive
    /// points are added to the score.
    pub fn record(&mut self, action_label: impl Into<String>, points: u32, clock: &impl Clock) {
        let entry = HistoryEntry {
            action_label: action_label.into(),
            points,
            timestamp_display: history_timestamp(clock.now()),
            phase: self.phase,
        };
        log::debug!(
            "recorded '{}' (+{}) during {}",
            entry.action_label,
            entry.points,
            entry.phase
        );
        self.history.push(entry);
        if points > 0 {
            self.score = self.score.saturating_add(points);
        }
    }

    pub fn log_choice(&mut self, choice: impl Into<String>) {
        self.choices.push(choice);
    }

    /// Apply a fixed bonus that has no history entry of its own.
    pub fn grant_bonus(&mut self, points: u32) {
        self.bonus_points = self.bonus_points.saturating_add(points);
        self.score = self.score.saturating_add(points);
    }

    /// Score equals recorded points plus granted bonuses.
    #[must_use]
    pub fn score_is_consistent(&self) -> bool {
        self.score == self.history.total_points().saturating_add(self.bonus_points)
    }

    /// Reset for a new playthrough. The team name survives a restart.
    pub fn reset(&mut self, countdown_secs: u32) {
        let team_name = std::mem::take(&mut self.team_name);
        *self = Self {
            phase: Phase::Briefing,
            team_name,
            score: 0,
            seconds_remaining: countdown_secs,
            history: HistoryLog::default(),
            choices: ChoiceLog::default(),
            bonus_points: 0,
        };
    }
}
