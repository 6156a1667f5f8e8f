use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::ScenarioResult;

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Logic Test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(out, "Total scenarios: {total_tests}")?;
    writeln!(out, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(out, "Failed: {}", failed_tests.to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(passed_tests, total_tests))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };

        writeln!(
            out,
            "{} {} (seed {})",
            status,
            result.scenario_name.bold(),
            result.seed
        )?;
        writeln!(
            out,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    let fastest = results.iter().min_by_key(|r| r.average_duration);
    let slowest = results.iter().max_by_key(|r| r.average_duration);
    if let (Some(fastest), Some(slowest)) = (fastest, slowest) {
        writeln!(out, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "=====================".yellow())?;
        writeln!(
            out,
            "Fastest: {} ({:?})",
            fastest.scenario_name.green(),
            fastest.average_duration
        )?;
        writeln!(
            out,
            "Slowest: {} ({:?})",
            slowest.scenario_name.yellow(),
            slowest.average_duration
        )?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(out, "# Reelrig Logic Test Results\n")?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total scenarios**: {total_tests}")?;
    writeln!(out, "- **Passed**: {passed_tests}")?;
    writeln!(out, "- **Failed**: {failed_tests}")?;
    writeln!(
        out,
        "- **Success rate**: {:.1}%\n",
        success_rate(passed_tests, total_tests)
    )?;

    writeln!(out, "## Detailed Results\n")?;

    for result in results {
        let status = if result.passed { "✅" } else { "❌" };

        writeln!(out, "### {} {} (seed {})\n", status, result.scenario_name, result.seed)?;
        writeln!(
            out,
            "- **Iterations**: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "- **Average time**: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn success_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (passed as f64 / total as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "Payout".to_string(),
            seed: 9,
            passed,
            iterations_run: 2,
            successful_iterations: if passed { 2 } else { 1 },
            failures: if passed {
                Vec::new()
            } else {
                vec!["Iteration 2 (seed 10): wallet drift".to_string()]
            },
            average_duration: Duration::from_millis(3),
            performance_data: vec![Duration::from_millis(3)],
        }
    }

    #[test]
    fn markdown_lists_failures() {
        let mut buf = Vec::new();
        generate_markdown_report(&mut buf, &[result(true), result(false)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("# Reelrig Logic Test Results"));
        assert!(text.contains("- **Success rate**: 50.0%"));
        assert!(text.contains("wallet drift"));
    }

    #[test]
    fn console_report_handles_empty_results() {
        let mut buf = Vec::new();
        generate_console_report(&mut buf, &[], Duration::ZERO).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Total scenarios: 0"));
        assert!(!text.contains("Performance Summary"));
    }

    #[test]
    fn json_report_is_an_array() {
        let mut buf = Vec::new();
        generate_json_report(&mut buf, &[result(true)]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["seed"], 9);
    }
}
