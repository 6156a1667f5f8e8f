mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{LogicTester, ScenarioResult, expand_keys, get_scenario, list_scenarios, parse_seeds};

#[derive(Debug, Parser)]
#[command(name = "reelrig-tester", version = "0.1.0")]
#[command(about = "Automated logic QA for the Reelrig slot machine engine")]
struct Args {
    /// Scenarios to run (comma-separated, `all` for every scenario)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated, decimal or 0x hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_keys(&split_csv(&args.scenarios));
    let seeds = parse_seeds(&split_csv(&args.seeds))?;

    let results = run_logic_scenarios(&args, &scenarios, &seeds);
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:12} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎰 Reelrig Automated Tester".bright_cyan().bold());
    println!("{}", "===========================".cyan());
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn run_logic_scenarios(args: &Args, scenarios: &[String], seeds: &[u64]) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let tester = LogicTester::new(args.verbose);
    let mut results = Vec::new();
    for scenario_name in scenarios {
        if let Some(scenario) = get_scenario(scenario_name) {
            results.extend(tester.run_scenario(&scenario, seeds, args.iterations));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }
    results
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results)?,
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Reelrig Logic Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No logic scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
        }
    }

    if args.report != "json" {
        let duration = start_time.elapsed();
        writeln!(&mut output_target)?;
        writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
