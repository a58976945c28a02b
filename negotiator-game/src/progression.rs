//! Stage-by-stage walk through the scenario catalog during negotiation.
use serde::Serialize;

use crate::catalog::{ScenarioCatalog, Stage};

/// Feedback surfaced immediately after an option is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionFeedback {
    pub text: String,
    pub points: u32,
    pub is_effective: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum StageStatus {
    #[default]
    AwaitingSelection,
    /// An option was accepted; input stays locked until the timed advance.
    Locked { option_index: usize },
    /// The last stage advanced; nothing further can be selected.
    Complete,
}

/// Result of an accepted selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub stage_index: usize,
    pub option_index: usize,
    pub action_label: String,
    pub points: u32,
    pub feedback: OptionFeedback,
}

/// Why a selection was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRejected {
    Locked,
    NotCurrentStage { current: usize },
    Complete,
}

/// What the timed advance did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAdvance {
    Next { stage_index: usize },
    Completed,
}

/// Render input for the active stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageView<'a> {
    pub index: usize,
    pub total: usize,
    pub stage: &'a Stage,
    pub locked: bool,
    pub selected_option: Option<usize>,
    pub feedback: Option<&'a OptionFeedback>,
    /// The pending advance will finish the negotiation.
    pub is_final: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StageProgression {
    current: usize,
    status: StageStatus,
    feedback: Option<OptionFeedback>,
}

impl StageProgression {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub const fn status(&self) -> StageStatus {
        self.status
    }

    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self.status, StageStatus::Locked { .. })
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.status, StageStatus::Complete)
    }

    #[must_use]
    pub const fn feedback(&self) -> Option<&OptionFeedback> {
        self.feedback.as_ref()
    }

    /// Accept `option_index` for `stage_index` if that stage is current and unlocked.
    ///
    /// # Panics
    ///
    /// Panics if either index is outside the catalog.
    pub fn select(
        &mut self,
        catalog: &ScenarioCatalog,
        stage_index: usize,
        option_index: usize,
    ) -> Result<Selection, SelectionRejected> {
        assert!(
            stage_index < catalog.len(),
            "stage index {stage_index} out of range (catalog has {} stages)",
            catalog.len()
        );
        let stage = &catalog.stages()[stage_index];
        assert!(
            option_index < stage.options.len(),
            "option index {option_index} out of range for stage {stage_index} ({} options)",
            stage.options.len()
        );

        match self.status {
            StageStatus::Complete => return Err(SelectionRejected::Complete),
            StageStatus::Locked { .. } if stage_index == self.current => {
                return Err(SelectionRejected::Locked);
            }
            _ if stage_index != self.current => {
                return Err(SelectionRejected::NotCurrentStage {
                    current: self.current,
                });
            }
            _ => {}
        }

        let option = &stage.options[option_index];
        let feedback = OptionFeedback {
            text: option.feedback_text.clone(),
            points: option.points,
            is_effective: option.is_effective(),
        };
        self.status = StageStatus::Locked { option_index };
        self.feedback = Some(feedback.clone());

        Ok(Selection {
            stage_index,
            option_index,
            action_label: stage.action_label(option),
            points: option.points,
            feedback,
        })
    }

    /// Apply the timed advance after a selection. `None` unless the stage is locked.
    pub fn advance(&mut self, total: usize) -> Option<StageAdvance> {
        if !self.is_locked() {
            return None;
        }
        if self.current + 1 >= total {
            self.status = StageStatus::Complete;
            return Some(StageAdvance::Completed);
        }
        self.current += 1;
        self.status = StageStatus::AwaitingSelection;
        self.feedback = None;
        Some(StageAdvance::Next {
            stage_index: self.current,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn view<'a>(&'a self, catalog: &'a ScenarioCatalog) -> Option<StageView<'a>> {
        let stage = catalog.stage(self.current)?;
        let selected_option = match self.status {
            StageStatus::Locked { option_index } => Some(option_index),
            _ => None,
        };
        Some(StageView {
            index: self.current,
            total: catalog.len(),
            stage,
            locked: !matches!(self.status, StageStatus::AwaitingSelection),
            selected_option,
            feedback: self.feedback.as_ref(),
            is_final: self.current + 1 == catalog.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_selection_locks_and_reports_feedback() {
        let catalog = ScenarioCatalog::builtin();
        let mut progression = StageProgression::new();

        let selection = progression.select(&catalog, 0, 0).unwrap();
        assert_eq!(selection.action_label, "Opening Phase: Collaborative opening");
        assert_eq!(selection.points, 30);
        assert!(selection.feedback.is_effective);
        assert!(progression.is_locked());

        let view = progression.view(&catalog).unwrap();
        assert!(view.locked);
        assert_eq!(view.selected_option, Some(0));
        assert_eq!(view.feedback.map(|f| f.points), Some(30));
    }

    #[test]
    fn first_selection_is_final() {
        let catalog = ScenarioCatalog::builtin();
        let mut progression = StageProgression::new();
        progression.select(&catalog, 0, 0).unwrap();
        assert_eq!(
            progression.select(&catalog, 0, 1),
            Err(SelectionRejected::Locked)
        );
        assert_eq!(
            progression.status(),
            StageStatus::Locked { option_index: 0 }
        );
    }

    #[test]
    fn only_current_stage_accepts_input() {
        let catalog = ScenarioCatalog::builtin();
        let mut progression = StageProgression::new();
        assert_eq!(
            progression.select(&catalog, 2, 0),
            Err(SelectionRejected::NotCurrentStage { current: 0 })
        );
        progression.select(&catalog, 0, 0).unwrap();
        progression.advance(catalog.len());
        assert_eq!(
            progression.select(&catalog, 0, 2),
            Err(SelectionRejected::NotCurrentStage { current: 1 })
        );
    }

    #[test]
    fn advance_walks_to_completion() {
        let catalog = ScenarioCatalog::builtin();
        let mut progression = StageProgression::new();
        assert_eq!(progression.advance(catalog.len()), None);

        for index in 0..catalog.len() {
            progression.select(&catalog, index, 0).unwrap();
            let outcome = progression.advance(catalog.len());
            if index + 1 == catalog.len() {
                assert_eq!(outcome, Some(StageAdvance::Completed));
            } else {
                assert_eq!(
                    outcome,
                    Some(StageAdvance::Next {
                        stage_index: index + 1
                    })
                );
                assert!(progression.feedback().is_none());
            }
        }
        assert!(progression.is_complete());
        assert_eq!(
            progression.select(&catalog, catalog.len() - 1, 0),
            Err(SelectionRejected::Complete)
        );
        assert!(progression.view(&catalog).unwrap().is_final);

        progression.reset();
        assert_eq!(progression, StageProgression::new());
    }

    #[test]
    #[should_panic(expected = "option index 3 out of range")]
    fn out_of_range_option_panics() {
        let catalog = ScenarioCatalog::builtin();
        let _ = StageProgression::new().select(&catalog, 0, 3);
    }

    #[test]
    #[should_panic(expected = "stage index")]
    fn out_of_range_stage_panics() {
        let catalog = ScenarioCatalog::builtin();
        let _ = StageProgression::new().select(&catalog, 9, 0);
    }
}
