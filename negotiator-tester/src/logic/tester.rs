use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::game_tester::{GameTester, PlaythroughSummary, check_invariants};
use super::scenarios::TestScenario;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

impl ScenarioResult {
    pub fn from_runs(
        scenario_name: impl Into<String>,
        iterations_run: usize,
        failures: Vec<String>,
        performance_data: Vec<Duration>,
    ) -> Self {
        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };
        Self {
            scenario_name: scenario_name.into(),
            passed: failures.is_empty(),
            iterations_run,
            successful_iterations: performance_data.len(),
            failures,
            average_duration,
            performance_data,
        }
    }
}

pub struct LogicTester {
    game_tester: GameTester,
}

impl LogicTester {
    pub const fn new(game_tester: GameTester) -> Self {
        Self { game_tester }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.game_tester.verbose() {
                    println!(
                        "🧪 Testing scenario: {} (strategy: {} seed: {})",
                        scenario.key.bright_white(),
                        scenario.plan.strategy.label(),
                        seed
                    );
                }
                self.run_iterations(scenario, seed, iterations)
            })
            .collect()
    }

    fn run_iterations(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let outcome = self
                .game_tester
                .run_plan(&scenario.plan, iteration_seed)
                .and_then(|summary| evaluate_expectations(scenario, &summary).map(|()| summary));

            match outcome {
                Ok(summary) => {
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    if self.game_tester.verbose() {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) seed:{} strategy:{} prep:{} score:{} path:{}",
                            i + 1,
                            iterations,
                            summary.seed,
                            summary.strategy.label(),
                            summary.preparation_entries,
                            summary.final_state.score,
                            summary.decision_path()
                        );
                    }
                }
                Err(err) => {
                    let message = format!(
                        "Iteration {} (strategy {}, seed {iteration_seed}): {err:#}",
                        i + 1,
                        scenario.plan.strategy.label()
                    );
                    if self.game_tester.verbose() {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            message.clone().red()
                        );
                    }
                    failures.push(message);
                }
            }
        }

        ScenarioResult::from_runs(
            format!("{} (seed {seed})", scenario.key),
            iterations,
            failures,
            performance_data,
        )
    }
}

fn evaluate_expectations(
    scenario: &TestScenario,
    summary: &PlaythroughSummary,
) -> anyhow::Result<()> {
    check_invariants(summary)?;
    for expectation in &scenario.plan.expectations {
        expectation.check(summary).map_err(|err| {
            err.context(format!(
                "path {} stage points {} score {}",
                summary.decision_path(),
                summary.stage_points,
                summary.final_state.score
            ))
        })?;
    }
    Ok(())
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::scenarios::get_scenario;

    #[test]
    fn best_path_scenario_passes_every_iteration() {
        let tester = LogicTester::new(GameTester::try_new(false));
        let scenario = get_scenario("best-path").unwrap();
        let results = tester.run_scenario(&scenario, &[1, 2], 3);
        assert_eq!(results.len(), 2);
        for result in &results {
            assert!(result.passed, "{:?}", result.failures);
            assert_eq!(result.successful_iterations, 3);
            assert_eq!(result.performance_data.len(), 3);
        }
        assert_eq!(results[0].scenario_name, "best-path (seed 1)");
    }

    #[test]
    fn failing_expectation_is_reported() {
        let tester = LogicTester::new(GameTester::try_new(false));
        let mut scenario = get_scenario("best-path").unwrap();
        scenario.plan = scenario
            .plan
            .with_expectation(|_: &PlaythroughSummary| Err(anyhow::anyhow!("always fails")));
        let results = tester.run_scenario(&scenario, &[5], 2);
        assert!(!results[0].passed);
        assert_eq!(results[0].failures.len(), 2);
        assert!(results[0].failures[0].contains("always fails"));
        assert_eq!(results[0].average_duration, Duration::ZERO);
    }

    #[test]
    fn result_serializes_durations_as_millis() {
        let result = ScenarioResult::from_runs(
            "demo",
            2,
            Vec::new(),
            vec![Duration::from_millis(4), Duration::from_millis(6)],
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 5);
        assert_eq!(json["performance_data"], serde_json::json!([4, 6]));
        let back: ScenarioResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.average_duration, Duration::from_millis(5));
    }
}
