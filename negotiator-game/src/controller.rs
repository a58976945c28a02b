//! Top-level phase state machine.
//!
//! [`PhaseController`] owns the session and every deferred transition. Time only
//! moves when the host calls [`PhaseController::advance_time`], which fires due
//! tasks in order and reports what happened as [`GameEvent`]s.

use serde::Serialize;
use std::time::Duration;

use crate::analysis::{PerformanceReport, analyze};
use crate::briefing::{MISSION_BRIEF, MissionBrief};
use crate::catalog::ScenarioCatalog;
use crate::clock::{Clock, SystemClock};
use crate::config::GameConfig;
use crate::constants::{COMPLETION_ACTION_LABEL, SMART_GOAL_ACTION_PREFIX};
use crate::error::GameError;
use crate::phase::{Phase, format_countdown};
use crate::preparation::{CulturalAdjustment, SmartGoalKey, SmartGoals, smart_goal_choice};
use crate::progression::{OptionFeedback, StageAdvance, StageProgression, StageView};
use crate::result::ResultExport;
use crate::scheduler::{Scheduler, TaskHandle};
use crate::session::SessionState;

/// Something that happened while time advanced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    CountdownTick { seconds_remaining: u32 },
    /// The countdown reached zero. Nothing else changes.
    CountdownExpired,
    StageAdvanced { stage_index: usize },
    NegotiationCompleted { bonus: u32 },
    DebriefEntered { bonus: u32, score: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredTask {
    CountdownTick,
    StageAdvance,
    DebriefTransition,
}

#[derive(Debug, Clone)]
pub struct PhaseController<C: Clock = SystemClock> {
    config: GameConfig,
    catalog: ScenarioCatalog,
    clock: C,
    session: SessionState,
    progression: StageProgression,
    smart_goals: SmartGoals,
    adjustment: CulturalAdjustment,
    report: Option<PerformanceReport>,
    scheduler: Scheduler<DeferredTask>,
    countdown: Option<TaskHandle>,
    stage_advance: Option<TaskHandle>,
    debrief_transition: Option<TaskHandle>,
}

impl PhaseController<SystemClock> {
    /// Controller stamping history with the system clock. `config` is expected
    /// to have passed [`GameConfig::validate`].
    #[must_use]
    pub fn new(config: GameConfig, catalog: ScenarioCatalog) -> Self {
        Self::with_clock(config, catalog, SystemClock)
    }
}

impl<C: Clock> PhaseController<C> {
    #[must_use]
    pub fn with_clock(config: GameConfig, catalog: ScenarioCatalog, clock: C) -> Self {
        let session = SessionState::new(&config);
        Self {
            config,
            catalog,
            clock,
            session,
            progression: StageProgression::new(),
            smart_goals: SmartGoals::default(),
            adjustment: CulturalAdjustment::default(),
            report: None,
            scheduler: Scheduler::new(),
            countdown: None,
            stage_advance: None,
            debrief_transition: None,
        }
    }

    // Render inputs -------------------------------------------------------

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.session.phase
    }

    #[must_use]
    pub const fn score(&self) -> u32 {
        self.session.score
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn catalog(&self) -> &ScenarioCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn mission_brief(&self) -> &'static MissionBrief {
        &MISSION_BRIEF
    }

    #[must_use]
    pub fn countdown_display(&self) -> String {
        format_countdown(self.session.seconds_remaining)
    }

    /// The active stage, only while negotiating.
    #[must_use]
    pub fn stage_view(&self) -> Option<StageView<'_>> {
        if self.session.phase != Phase::Negotiation {
            return None;
        }
        self.progression.view(&self.catalog)
    }

    #[must_use]
    pub const fn progression(&self) -> &StageProgression {
        &self.progression
    }

    #[must_use]
    pub const fn smart_goals(&self) -> &SmartGoals {
        &self.smart_goals
    }

    #[must_use]
    pub fn missing_smart_goals(&self) -> Vec<SmartGoalKey> {
        self.smart_goals.missing(self.config.smart_goal_min_chars)
    }

    #[must_use]
    pub fn is_ready_to_negotiate(&self) -> bool {
        self.smart_goals.all_satisfied(self.config.smart_goal_min_chars)
    }

    #[must_use]
    pub const fn cultural_adjustment(&self) -> CulturalAdjustment {
        self.adjustment
    }

    /// Debrief analysis, computed once on entering the debrief.
    #[must_use]
    pub const fn report(&self) -> Option<&PerformanceReport> {
        self.report.as_ref()
    }

    /// Milliseconds of virtual time elapsed since the controller was created.
    #[must_use]
    pub const fn elapsed_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    #[must_use]
    pub fn has_pending_debrief_transition(&self) -> bool {
        self.debrief_transition
            .is_some_and(|handle| self.scheduler.is_pending(handle))
    }

    #[must_use]
    pub fn has_pending_stage_advance(&self) -> bool {
        self.stage_advance
            .is_some_and(|handle| self.scheduler.is_pending(handle))
    }

    #[must_use]
    pub fn is_countdown_running(&self) -> bool {
        self.countdown
            .is_some_and(|handle| self.scheduler.is_pending(handle))
    }

    // Player events -------------------------------------------------------

    /// Set the team name from raw input; surrounding whitespace is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidTeamName`] when the trimmed name is empty or too
    /// long. The previous name is kept.
    pub fn set_team_name(&mut self, text: &str) -> Result<(), GameError> {
        let name = text.trim();
        let len = name.chars().count();
        let max = self.config.team_name_max_chars;
        if len == 0 || len > max {
            log::warn!("rejected team name of {len} characters");
            return Err(GameError::InvalidTeamName { len, max });
        }
        self.session.team_name = name.to_string();
        Ok(())
    }

    /// Raw transition to any phase. Re-entering the active phase does nothing.
    pub fn advance(&mut self, target: Phase) {
        let from = self.session.phase;
        if from == target {
            return;
        }

        if from == Phase::Negotiation {
            let countdown = self.countdown.take();
            let stage_advance = self.stage_advance.take();
            self.cancel(countdown);
            self.cancel(stage_advance);
        }
        if from == Phase::Debrief {
            self.report = None;
        }

        self.session.phase = target;
        log::info!("phase {from} -> {target}");

        match target {
            Phase::Negotiation => {
                self.progression.reset();
                self.start_countdown();
            }
            Phase::Debrief => {
                self.report = Some(analyze(
                    self.session.score,
                    &self.session.history,
                    &self.session.choices,
                ));
            }
            Phase::Briefing | Phase::Preparation => {}
        }

        self.sync_debrief_transition();
    }

    pub fn begin_preparation(&mut self) {
        self.advance(Phase::Preparation);
    }

    /// Move on to the negotiation once every SMART goal is written.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::PreparationIncomplete`] listing the unsatisfied goals.
    pub fn begin_negotiation(&mut self) -> Result<(), GameError> {
        let missing = self.missing_smart_goals();
        if !missing.is_empty() {
            log::warn!("negotiation blocked; {} SMART goals missing", missing.len());
            return Err(GameError::PreparationIncomplete { missing });
        }
        self.advance(Phase::Negotiation);
        Ok(())
    }

    /// Store a SMART goal and score it. Returns whether the goal now counts
    /// toward readiness.
    pub fn commit_smart_goal(&mut self, key: SmartGoalKey, text: &str) -> bool {
        self.smart_goals.set(key, text);
        let choice = smart_goal_choice(key, text, self.config.smart_goal_preview_chars);
        self.session.record(
            format!("{SMART_GOAL_ACTION_PREFIX}{choice}"),
            self.config.smart_goal_points,
            &self.clock,
        );
        self.session.log_choice(choice);
        self.sync_debrief_transition();
        self.smart_goals
            .is_satisfied(key, self.config.smart_goal_min_chars)
    }

    /// Select a cultural adjustment by id (`flexible`, `phased`, `milestone`, `hybrid`).
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownAdjustment`] for any other id.
    pub fn set_cultural_adjustment(&mut self, id: &str) -> Result<CulturalAdjustment, GameError> {
        let adjustment = id.parse::<CulturalAdjustment>().map_err(|()| {
            log::warn!("unknown cultural adjustment '{id}'");
            GameError::UnknownAdjustment(id.to_string())
        })?;
        self.choose_cultural_adjustment(adjustment);
        Ok(adjustment)
    }

    /// Pick a cultural adjustment. It is logged and scored like a SMART goal.
    pub fn choose_cultural_adjustment(&mut self, adjustment: CulturalAdjustment) {
        self.adjustment = adjustment;
        let choice = adjustment.choice_text();
        self.session.record(
            format!("{SMART_GOAL_ACTION_PREFIX}{choice}"),
            self.config.smart_goal_points,
            &self.clock,
        );
        self.session.log_choice(choice);
        self.sync_debrief_transition();
    }

    /// Pick an option for the current stage. Returns the feedback when accepted and
    /// `None` when the selection is ignored (wrong phase, locked or not current).
    ///
    /// # Panics
    ///
    /// Panics if `stage_index` or `option_index` is outside the catalog.
    pub fn select_option(
        &mut self,
        stage_index: usize,
        option_index: usize,
    ) -> Option<OptionFeedback> {
        if self.session.phase != Phase::Negotiation {
            log::warn!(
                "ignored selection of stage {stage_index} during {}",
                self.session.phase
            );
            return None;
        }

        let selection = match self
            .progression
            .select(&self.catalog, stage_index, option_index)
        {
            Ok(selection) => selection,
            Err(reason) => {
                log::warn!("ignored selection of stage {stage_index}: {reason:?}");
                return None;
            }
        };

        self.session
            .record(selection.action_label.as_str(), selection.points, &self.clock);
        self.session.log_choice(selection.action_label);
        self.stage_advance = Some(self.schedule(
            self.config.stage_feedback_delay_ms,
            DeferredTask::StageAdvance,
        ));
        self.sync_debrief_transition();
        Some(selection.feedback)
    }

    /// Reset to a fresh briefing. Pending timers are dropped and the countdown
    /// restarts from the configured restart duration.
    pub fn restart(&mut self) {
        self.scheduler.clear();
        self.countdown = None;
        self.stage_advance = None;
        self.debrief_transition = None;
        self.session.reset(self.config.restart_countdown_secs);
        self.progression.reset();
        self.smart_goals = SmartGoals::default();
        self.adjustment = CulturalAdjustment::default();
        self.report = None;
        log::info!("session restarted for team '{}'", self.session.team_name);
    }

    /// Build the export document for the current debrief.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ReportUnavailable`] outside the debrief.
    pub fn export(&self) -> Result<ResultExport, GameError> {
        let report = self.report.as_ref().ok_or(GameError::ReportUnavailable)?;
        Ok(ResultExport::new(
            &self.session.team_name,
            report,
            self.clock.now(),
        ))
    }

    // Time ----------------------------------------------------------------

    /// Move virtual time forward, firing every task that falls due on the way.
    pub fn advance_time(&mut self, elapsed: Duration) -> Vec<GameEvent> {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let until = self.scheduler.now_ms().saturating_add(elapsed_ms);
        let mut events = Vec::new();

        while let Some((handle, task)) = self.scheduler.pop_due(until) {
            log::debug!("firing {task:?} at {} ms", self.scheduler.now_ms());
            match task {
                DeferredTask::CountdownTick => self.on_countdown_tick(handle, &mut events),
                DeferredTask::StageAdvance => self.on_stage_advance(handle, &mut events),
                DeferredTask::DebriefTransition => {
                    self.on_debrief_transition(handle, &mut events);
                }
            }
        }

        self.scheduler.settle_at(until);
        events
    }

    fn on_countdown_tick(&mut self, handle: TaskHandle, events: &mut Vec<GameEvent>) {
        if self.countdown == Some(handle) {
            self.countdown = None;
        }
        let seconds_remaining = self.session.seconds_remaining.saturating_sub(1);
        self.session.seconds_remaining = seconds_remaining;
        events.push(GameEvent::CountdownTick { seconds_remaining });

        if seconds_remaining == 0 {
            log::info!("negotiation countdown expired");
            events.push(GameEvent::CountdownExpired);
        } else {
            self.start_countdown();
        }
    }

    fn on_stage_advance(&mut self, handle: TaskHandle, events: &mut Vec<GameEvent>) {
        if self.stage_advance == Some(handle) {
            self.stage_advance = None;
        }
        match self.progression.advance(self.catalog.len()) {
            Some(StageAdvance::Next { stage_index }) => {
                events.push(GameEvent::StageAdvanced { stage_index });
            }
            Some(StageAdvance::Completed) => {
                let bonus = self.config.stage_completion_bonus;
                self.session
                    .record(COMPLETION_ACTION_LABEL, bonus, &self.clock);
                log::info!("all {} stages completed", self.catalog.len());
                events.push(GameEvent::NegotiationCompleted { bonus });
                self.sync_debrief_transition();
            }
            None => {}
        }
    }

    fn on_debrief_transition(&mut self, handle: TaskHandle, events: &mut Vec<GameEvent>) {
        if self.debrief_transition == Some(handle) {
            self.debrief_transition = None;
        }
        let bonus = self.config.debrief_bonus;
        self.session.grant_bonus(bonus);
        self.advance(Phase::Debrief);
        events.push(GameEvent::DebriefEntered {
            bonus,
            score: self.session.score,
        });
    }

    fn start_countdown(&mut self) {
        if self.session.seconds_remaining == 0 {
            return;
        }
        self.countdown = Some(self.schedule(
            self.config.countdown_tick_ms,
            DeferredTask::CountdownTick,
        ));
    }

    /// Keep exactly one pending debrief hand-off while the last history entry is
    /// the completion marker during negotiation, and none otherwise.
    fn sync_debrief_transition(&mut self) {
        let pending = self.debrief_transition.take();
        self.cancel(pending);
        let completed = self
            .session
            .history
            .last()
            .is_some_and(|entry| entry.action_label == COMPLETION_ACTION_LABEL);
        if self.session.phase == Phase::Negotiation && completed {
            self.debrief_transition = Some(self.schedule(
                self.config.debrief_transition_delay_ms,
                DeferredTask::DebriefTransition,
            ));
        }
    }

    fn schedule(&mut self, delay_ms: u64, task: DeferredTask) -> TaskHandle {
        let handle = self.scheduler.schedule_after(delay_ms, task);
        log::debug!("scheduled {task:?} in {delay_ms} ms ({handle:?})");
        handle
    }

    fn cancel(&mut self, handle: Option<TaskHandle>) {
        if let Some(handle) = handle
            && self.scheduler.cancel(handle)
        {
            log::debug!("cancelled {handle:?}");
        }
    }
}
