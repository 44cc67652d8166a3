use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::scenarios::{Scenario, ScenarioCtx};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    /// Summary line of the last successful iteration.
    pub note: Option<String>,
    #[serde(with = "duration_millis")]
    pub average_duration: Duration,
}

pub struct LogicTester<'a> {
    ctx: &'a ScenarioCtx,
}

impl<'a> LogicTester<'a> {
    #[must_use]
    pub const fn new(ctx: &'a ScenarioCtx) -> Self {
        Self { ctx }
    }

    /// One result per seed; iteration `i` runs with `seed + i`.
    pub fn run_scenario(
        &self,
        scenario: &Scenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.ctx.verbose {
                    println!(
                        "🧪 Testing scenario: {} (strategy: {} seed: {seed})",
                        scenario.name.bright_white(),
                        self.ctx.strategy
                    );
                }
                self.run_single_scenario(scenario, seed, iterations)
            })
            .collect()
    }

    fn run_single_scenario(
        &self,
        scenario: &Scenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut note = None;
        let mut timings = Vec::new();

        for i in 0..iterations {
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let start_time = Instant::now();
            match scenario.run(self.ctx, iteration_seed) {
                Ok(summary) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    timings.push(duration);
                    if self.ctx.verbose {
                        println!(
                            "  ✅ Iteration {}/{iterations} passed ({duration:?}) {summary}",
                            i + 1
                        );
                    }
                    note = Some(summary);
                }
                Err(err) => {
                    let message = format!(
                        "Iteration {} (seed {iteration_seed}, strategy {}): {err:#}",
                        i + 1,
                        self.ctx.strategy
                    );
                    if self.ctx.verbose {
                        println!("  ❌ {}", message.clone().red());
                    }
                    log::warn!("{} failed: {message}", scenario.key);
                    failures.push(message);
                }
            }
        }

        let average_duration = if timings.is_empty() {
            Duration::ZERO
        } else {
            timings.iter().sum::<Duration>() / u32::try_from(timings.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.to_string(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            note,
            average_duration,
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::policy::Strategy;
    use crate::logic::scenarios::get_scenario;
    use matchday_game::CareerEngine;
    use std::sync::Arc;

    #[test]
    fn one_result_per_seed_with_all_iterations() {
        let ctx = ScenarioCtx {
            engine: Arc::new(CareerEngine::with_defaults().unwrap()),
            strategy: Strategy::Steady,
            verbose: false,
        };
        let tester = LogicTester::new(&ctx);
        let scenario = get_scenario("idempotent-finish").unwrap();
        let results = tester.run_scenario(scenario, &[3, 4], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].seed, 3);
        for result in &results {
            assert!(result.passed, "{:?}", result.failures);
            assert_eq!(result.successful_iterations, 2);
            assert!(result.note.is_some());
        }
    }

    #[test]
    fn results_serialize_durations_as_millis() {
        let result = ScenarioResult {
            scenario_name: "Full Season".to_string(),
            seed: 1,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            note: None,
            average_duration: Duration::from_millis(12),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 12);
        let back: ScenarioResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.average_duration, Duration::from_millis(12));
    }
}
