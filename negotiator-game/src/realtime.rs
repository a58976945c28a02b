//! Wall-clock driver for hosts that let the game run on its own.
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

use crate::clock::Clock;
use crate::controller::{GameEvent, PhaseController};

/// Advance `controller` by real elapsed time every `period` until `stop` returns
/// `true`. `stop` sees the controller after each step together with the events
/// that step produced. Returns every event fired, in order.
pub async fn drive_realtime<C, F>(
    controller: &mut PhaseController<C>,
    period: Duration,
    mut stop: F,
) -> Vec<GameEvent>
where
    C: Clock,
    F: FnMut(&PhaseController<C>, &[GameEvent]) -> bool,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    let mut last = Instant::now();
    let mut fired = Vec::new();
    loop {
        ticker.tick().await;
        let now = Instant::now();
        let events = controller.advance_time(now.duration_since(last));
        last = now;

        let done = stop(controller, &events);
        fired.extend(events);
        if done {
            log::debug!("realtime driver stopped after {} events", fired.len());
            return fired;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ScenarioCatalog;
    use crate::config::GameConfig;
    use crate::phase::Phase;

    #[tokio::test(start_paused = true)]
    async fn countdown_runs_on_the_tokio_clock() {
        let mut game = PhaseController::new(GameConfig::default(), ScenarioCatalog::builtin());
        game.advance(Phase::Negotiation);

        let events = drive_realtime(&mut game, Duration::from_millis(250), |game, _| {
            game.state().seconds_remaining <= 1795
        })
        .await;

        assert_eq!(game.countdown_display(), "29:55");
        let ticks = events
            .iter()
            .filter(|e| matches!(e, GameEvent::CountdownTick { .. }))
            .count();
        assert_eq!(ticks, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn best_path_reaches_debrief_on_wall_clock() {
        let mut game = PhaseController::new(GameConfig::default(), ScenarioCatalog::builtin());
        game.advance(Phase::Negotiation);

        for stage in 0..game.catalog().len() {
            let best = game.catalog().stages()[stage].best_option_index();
            game.select_option(stage, best).unwrap();
            drive_realtime(&mut game, Duration::from_millis(100), |_, events| {
                events.iter().any(|e| {
                    matches!(
                        e,
                        GameEvent::StageAdvanced { .. } | GameEvent::NegotiationCompleted { .. }
                    )
                })
            })
            .await;
        }

        let events = drive_realtime(&mut game, Duration::from_millis(100), |game, _| {
            game.phase() == Phase::Debrief
        })
        .await;

        assert!(events.contains(&GameEvent::DebriefEntered {
            bonus: 200,
            score: 535,
        }));
        assert_eq!(game.report().map(|r| r.grade.as_str()), Some("A+"));
    }
}
