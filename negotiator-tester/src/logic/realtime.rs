use anyhow::{Result, anyhow, ensure};
use negotiator_game::{
    GameConfig, GameEvent, Phase, PhaseController, ScenarioCatalog, drive_realtime,
};
use std::time::{Duration, Instant};

use super::ScenarioResult;

pub const REALTIME_SCENARIO: &str = "realtime-best-path";

/// Wall-clock timings scaled down so a whole session fits in well under a second.
pub fn compressed_config() -> GameConfig {
    GameConfig {
        countdown_tick_ms: 10,
        stage_feedback_delay_ms: 30,
        debrief_transition_delay_ms: 20,
        ..GameConfig::default()
    }
}

/// Play the best path on the tokio clock and check the debrief arrives with
/// both bonuses.
pub async fn run_realtime_check(catalog: ScenarioCatalog, limit: Duration) -> ScenarioResult {
    let started = Instant::now();
    let outcome = tokio::time::timeout(limit, play_best_path(catalog))
        .await
        .map_err(|_| anyhow!("session did not reach the debrief within {limit:?}"))
        .and_then(|result| result);

    match outcome {
        Ok(()) => ScenarioResult::from_runs(REALTIME_SCENARIO, 1, Vec::new(), vec![started.elapsed()]),
        Err(err) => ScenarioResult::from_runs(REALTIME_SCENARIO, 1, vec![format!("{err:#}")], Vec::new()),
    }
}

async fn play_best_path(catalog: ScenarioCatalog) -> Result<()> {
    let config = compressed_config();
    config.validate()?;
    let expected =
        catalog.max_stage_points() + config.stage_completion_bonus + config.debrief_bonus;
    let period = Duration::from_millis(config.countdown_tick_ms / 2).max(Duration::from_millis(1));

    let mut game = PhaseController::new(config, catalog);
    game.advance(Phase::Negotiation);

    for stage in 0..game.catalog().len() {
        let best = game.catalog().stages()[stage].best_option_index();
        game.select_option(stage, best)
            .ok_or_else(|| anyhow!("stage {stage} rejected the best option"))?;
        drive_realtime(&mut game, period, |_, events| {
            events.iter().any(|e| {
                matches!(
                    e,
                    GameEvent::StageAdvanced { .. } | GameEvent::NegotiationCompleted { .. }
                )
            })
        })
        .await;
    }

    let events = drive_realtime(&mut game, period, |game, _| game.phase() == Phase::Debrief).await;
    ensure!(
        events.contains(&GameEvent::DebriefEntered {
            bonus: game.config().debrief_bonus,
            score: expected,
        }),
        "debrief entered with score {} expected {expected}",
        game.score()
    );
    ensure!(
        !game.is_countdown_running() && game.state().seconds_remaining > 0,
        "countdown still running in debrief"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressed_config_is_valid() {
        compressed_config().validate().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn builtin_catalog_passes_realtime_check() {
        let result = run_realtime_check(ScenarioCatalog::builtin(), Duration::from_secs(5)).await;
        assert!(result.passed, "{:?}", result.failures);
        assert_eq!(result.scenario_name, REALTIME_SCENARIO);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_catalog_expects_its_own_best_total() {
        let mut stages = ScenarioCatalog::builtin().stages().to_vec();
        stages[0].options[1].points = 90;
        stages.truncate(2);
        let catalog = ScenarioCatalog::new(stages).unwrap();
        assert_eq!(catalog.max_stage_points(), 130);

        let result = run_realtime_check(catalog, Duration::from_secs(5)).await;
        assert!(result.passed, "{:?}", result.failures);
    }
}
