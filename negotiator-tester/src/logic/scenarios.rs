use anyhow::{Result, ensure};
use negotiator_game::{CulturalAdjustment, GameEvent, Grade, Phase};

use super::game_tester::{Disruption, GameplayStrategy, PlaythroughPlan, PlaythroughSummary};

/// Named playthrough with the checks that must hold afterwards.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub key: &'static str,
    pub description: &'static str,
    pub plan: PlaythroughPlan,
}

impl TestScenario {
    fn new(key: &'static str, description: &'static str, plan: PlaythroughPlan) -> Self {
        Self {
            key,
            description,
            plan,
        }
    }
}

pub fn all_scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario::new(
            "best-path",
            "Highest-scoring option at every stage, no preparation",
            PlaythroughPlan::new(GameplayStrategy::Best)
                .with_expectation(reaches_debrief)
                .with_expectation(|s: &PlaythroughSummary| expect_score(s, 535, Grade::APlus)),
        ),
        TestScenario::new(
            "prepared-path",
            "SMART goals and a flexible adjustment before the best path",
            PlaythroughPlan::new(GameplayStrategy::Best)
                .prepared(CulturalAdjustment::Flexible)
                .with_expectation(reaches_debrief)
                .with_expectation(|s: &PlaythroughSummary| expect_score(s, 835, Grade::APlus))
                .with_expectation(cultural_credit_for_adjustment),
        ),
        TestScenario::new(
            "worst-path",
            "Lowest-scoring option at every stage",
            PlaythroughPlan::new(GameplayStrategy::Worst)
                .with_expectation(reaches_debrief)
                .with_expectation(|s: &PlaythroughSummary| expect_score(s, 390, Grade::BPlus)),
        ),
        TestScenario::new(
            "random-path",
            "Seeded random options after full preparation",
            PlaythroughPlan::new(GameplayStrategy::Random)
                .prepared(CulturalAdjustment::Hybrid)
                .with_expectation(reaches_debrief)
                .with_expectation(bonuses_granted_once),
        ),
        TestScenario::new(
            "locked-reselect",
            "Every locked stage ignores further selections",
            PlaythroughPlan::new(GameplayStrategy::Random)
                .with_disruption(Disruption::ReselectLocked)
                .with_expectation(reaches_debrief)
                .with_expectation(reselections_ignored),
        ),
        TestScenario::new(
            "restart-midway",
            "Restart halfway through, then play the best path",
            PlaythroughPlan::new(GameplayStrategy::Best)
                .with_disruption(Disruption::RestartMidway)
                .with_expectation(reaches_debrief)
                .with_expectation(|s: &PlaythroughSummary| expect_score(s, 535, Grade::APlus))
                .with_expectation(fresh_after_restart),
        ),
        TestScenario::new(
            "cancelled-debrief",
            "Leaving before the debrief hand-off forfeits the bonus",
            PlaythroughPlan::new(GameplayStrategy::Best)
                .with_disruption(Disruption::LeaveBeforeDebrief)
                .with_expectation(debrief_cancelled),
        ),
        TestScenario::new(
            "countdown-expiry",
            "Countdown runs out without blocking selections",
            PlaythroughPlan::new(GameplayStrategy::Random)
                .with_disruption(Disruption::IdleUntilExpiry)
                .with_expectation(reaches_debrief)
                .with_expectation(countdown_expired_once),
        ),
    ]
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    all_scenarios()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

pub fn get_scenario(key: &str) -> Option<TestScenario> {
    all_scenarios()
        .into_iter()
        .find(|scenario| scenario.key == key)
}

fn reaches_debrief(summary: &PlaythroughSummary) -> Result<()> {
    ensure!(
        summary.final_state.phase == Phase::Debrief,
        "ended in {} instead of debrief",
        summary.final_state.phase
    );
    ensure!(summary.report.is_some(), "debrief has no report");
    Ok(())
}

fn expect_score(summary: &PlaythroughSummary, score: u32, grade: Grade) -> Result<()> {
    ensure!(
        summary.final_state.score == score,
        "score {} expected {score}",
        summary.final_state.score
    );
    let actual = summary.report.as_ref().map(|report| report.grade);
    ensure!(actual == Some(grade), "grade {actual:?} expected {grade}");
    Ok(())
}

fn cultural_credit_for_adjustment(summary: &PlaythroughSummary) -> Result<()> {
    let cultural = summary.report.as_ref().map_or(0, |r| r.cultural_score);
    ensure!(cultural >= 20, "cultural score {cultural} ignores the adjustment");
    Ok(())
}

fn bonuses_granted_once(summary: &PlaythroughSummary) -> Result<()> {
    let completions =
        summary.count_events(|e| matches!(e, GameEvent::NegotiationCompleted { .. }));
    let debriefs = summary.count_events(|e| matches!(e, GameEvent::DebriefEntered { .. }));
    ensure!(completions == 1, "{completions} completion bonuses");
    ensure!(debriefs == 1, "{debriefs} debrief bonuses");
    Ok(())
}

fn reselections_ignored(summary: &PlaythroughSummary) -> Result<()> {
    let stages = summary.picks.len();
    ensure!(
        summary.ignored_reselections == stages * 3,
        "{} reselections ignored across {stages} stages",
        summary.ignored_reselections
    );
    // One entry per stage plus the completion marker.
    ensure!(
        summary.final_state.history.len() == stages + 1,
        "history has {} entries",
        summary.final_state.history.len()
    );
    Ok(())
}

fn fresh_after_restart(summary: &PlaythroughSummary) -> Result<()> {
    ensure!(summary.restarted, "restart never happened");
    ensure!(
        summary.final_state.history.len() == summary.picks.len() + 1,
        "history carried over the restart"
    );
    Ok(())
}

fn debrief_cancelled(summary: &PlaythroughSummary) -> Result<()> {
    ensure!(
        summary.final_state.phase == Phase::Preparation,
        "ended in {}",
        summary.final_state.phase
    );
    ensure!(summary.final_state.bonus_points == 0, "debrief bonus granted");
    let debriefs = summary.count_events(|e| matches!(e, GameEvent::DebriefEntered { .. }));
    ensure!(debriefs == 0, "debrief entered after cancellation");
    Ok(())
}

fn countdown_expired_once(summary: &PlaythroughSummary) -> Result<()> {
    let expiries = summary.count_events(|e| matches!(e, GameEvent::CountdownExpired));
    ensure!(expiries == 1, "countdown expired {expiries} times");
    ensure!(
        summary.final_state.seconds_remaining == 0,
        "countdown left at {}",
        summary.final_state.seconds_remaining
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::game_tester::{GameTester, check_invariants};

    #[test]
    fn scenario_keys_are_unique() {
        let mut keys: Vec<_> = list_scenarios().into_iter().map(|(key, _)| key).collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }

    #[test]
    fn every_scenario_passes_for_a_handful_of_seeds() {
        let tester = GameTester::try_new(false);
        for scenario in all_scenarios() {
            for seed in [1, 1337, 9001] {
                let summary = tester.run_plan(&scenario.plan, seed).unwrap();
                check_invariants(&summary).unwrap();
                for expectation in &scenario.plan.expectations {
                    expectation
                        .check(&summary)
                        .unwrap_or_else(|err| panic!("{} seed {seed}: {err}", scenario.key));
                }
            }
        }
    }

    #[test]
    fn unknown_scenario_is_none() {
        assert!(get_scenario("smoke").is_none());
        assert!(get_scenario("best-path").is_some());
    }
}
