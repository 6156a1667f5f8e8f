use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::logic::scenarios::LogicScenario;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct LogicTester {
    verbose: bool,
}

impl LogicTester {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// One result per seed; iteration `i` runs with `seed + i`.
    pub fn run_scenario(
        &self,
        scenario: &LogicScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.verbose {
                    println!(
                        "🧪 Testing scenario: {} (seed: {seed})",
                        scenario.name.bright_white()
                    );
                }
                self.run_single_scenario(scenario, seed, iterations)
            })
            .collect()
    }

    fn run_single_scenario(
        &self,
        scenario: &LogicScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            match scenario.run(iteration_seed) {
                Ok(()) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?})",
                            i + 1,
                            iterations
                        );
                    }
                }
                Err(err) => {
                    let message = format!("{err:#}");
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            message.clone().red()
                        );
                    }
                    failures.push(format!(
                        "Iteration {} (seed {iteration_seed}): {message}",
                        i + 1
                    ));
                }
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.to_string(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            performance_data,
        }
    }
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
        let millis = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::get_scenario;

    #[test]
    fn runs_one_result_per_seed() {
        let scenario = get_scenario("smoke").unwrap();
        let results = LogicTester::new(false).run_scenario(&scenario, &[1, 2], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].seed, 2);
        assert!(results.iter().all(|r| r.passed && r.successful_iterations == 2));
        assert!(results.iter().all(|r| r.performance_data.len() == 2));
    }

    #[test]
    fn durations_serialize_as_millis() {
        let result = ScenarioResult {
            scenario_name: "Smoke".to_string(),
            seed: 7,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_duration: Duration::from_millis(12),
            performance_data: vec![Duration::from_millis(12)],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 12);
        assert_eq!(json["performance_data"][0], 12);
        let back: ScenarioResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.average_duration, Duration::from_millis(12));
    }
}
