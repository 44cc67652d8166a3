mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use matchday_game::{CareerConfig, CareerEngine, ClubDirectory};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use logic::{
    LogicTester, ScenarioCtx, ScenarioResult, Strategy, all_keys, get_scenario, list_scenarios,
    resolve_seed_inputs,
};

#[derive(Debug, Parser)]
#[command(name = "matchday-tester", version)]
#[command(about = "Automated logic scenarios for the Matchday career engine")]
struct Args {
    /// Scenarios to run (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated integers, 0x-hex, or "random")
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// How the automated player presses match buttons
    #[arg(long, value_enum, default_value_t = Strategy::Random)]
    strategy: Strategy,

    /// JSON career config (season, match and transfer tuning)
    #[arg(long)]
    config: Option<PathBuf>,

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
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let ctx = ScenarioCtx {
        engine: Arc::new(build_engine(args.config.as_deref())?),
        strategy: args.strategy,
        verbose: args.verbose,
    };

    let results = run_logic_scenarios(&args, &ctx, &seeds);
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn build_engine(config: Option<&Path>) -> Result<CareerEngine> {
    let career = match config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str::<CareerConfig>(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => CareerConfig::default(),
    };
    CareerEngine::new(career, ClubDirectory::default()).context("invalid career config")
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:20} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "⚽ Matchday Automated Tester".bright_green().bold());
    println!("{}", "============================".green());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for key in all_keys() {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}

fn run_logic_scenarios(args: &Args, ctx: &ScenarioCtx, seeds: &[u64]) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let tester = LogicTester::new(ctx);
    let mut results = Vec::new();
    for scenario_name in expand_scenarios(&args.scenarios) {
        if let Some(scenario) = get_scenario(&scenario_name) {
            results.extend(tester.run_scenario(scenario, seeds, args.iterations));
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
                    "# Matchday Logic Test Results\n\n_No scenarios executed._"
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

    if args.report == "console" {
        writeln!(&mut output_target)?;
        writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base_args() -> Args {
        Args {
            scenarios: "all".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            iterations: 1,
            strategy: Strategy::Steady,
            config: None,
            report: "json".to_string(),
            verbose: false,
            output: None,
        }
    }

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("matchday-{}-{name}", std::process::id()))
    }

    fn sample_result() -> ScenarioResult {
        ScenarioResult {
            scenario_name: "Full Season".to_string(),
            seed: 1337,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            note: Some("18 rounds as forward".to_string()),
            average_duration: Duration::from_millis(4),
        }
    }

    #[test]
    fn all_expands_to_the_catalog_without_duplicates() {
        let expanded = expand_scenarios("winter-break, all");
        assert_eq!(expanded[0], "winter-break");
        assert_eq!(expanded.len(), all_keys().len());
    }

    #[test]
    fn explicit_scenarios_keep_their_order() {
        assert_eq!(
            expand_scenarios("full-season,calendar-integrity"),
            vec!["full-season".to_string(), "calendar-integrity".to_string()]
        );
    }

    #[test]
    fn list_scenarios_writes_every_key() {
        let temp = temp_file("scenarios.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available scenarios"));
        for key in all_keys() {
            assert!(content.contains(key));
        }
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }

    #[test]
    fn json_report_goes_to_the_output_file() {
        let temp = temp_file("report.json");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result()], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value[0]["scenario_name"], "Full Season");
    }

    #[test]
    fn markdown_report_handles_no_results() {
        let temp = temp_file("report.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("No scenarios executed"));
    }

    #[test]
    fn config_file_overrides_reach_the_engine() {
        let temp = temp_file("career.json");
        std::fs::write(&temp, r#"{"season": {"rounds": 6}}"#).unwrap();
        let engine = build_engine(Some(&temp)).unwrap();
        assert_eq!(engine.clock().config().rounds, 6);

        std::fs::write(&temp, r#"{"matches": {"tackle_success": 1.5}}"#).unwrap();
        assert!(build_engine(Some(&temp)).is_err());
    }

    #[test]
    fn unknown_scenarios_are_skipped() {
        let ctx = ScenarioCtx {
            engine: Arc::new(CareerEngine::with_defaults().unwrap()),
            strategy: Strategy::Steady,
            verbose: false,
        };
        let args = Args {
            scenarios: "no-such-scenario".to_string(),
            ..base_args()
        };
        assert!(run_logic_scenarios(&args, &ctx, &[1]).is_empty());
    }
}
