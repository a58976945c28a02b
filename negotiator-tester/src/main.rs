mod common;
mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use negotiator_game::{DataLoader, JsonDataLoader};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use common::{parse_seeds, read_optional, split_csv};
use logic::{GameTester, LogicTester, get_scenario, list_scenarios, run_realtime_check};

#[derive(Debug, Parser)]
#[command(name = "negotiator-tester", version = "0.1.0")]
#[command(about = "Automated playthrough QA for Global Negotiator's Quest")]
struct Args {
    /// Scenarios to run (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated)
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

    /// Also play one session on the wall clock with compressed timings
    #[arg(long)]
    realtime: bool,

    /// JSON file replacing the built-in negotiation stages
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// JSON file overriding timing and scoring configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios);
    let seeds = parse_seeds(&args.seeds)?;
    let loader = build_loader(&args)?;
    let game_tester = GameTester::new(loader.clone(), args.verbose);
    game_tester.validate()?;

    let mut all_results = run_logic_scenarios(&args, &scenarios, &seeds, &game_tester);

    if args.realtime {
        println!("{}", "⏱️  Running Realtime Check".bright_blue().bold());
        println!("{}", "-".repeat(30).blue());
        let catalog = loader.load_catalog()?;
        all_results.push(run_realtime_check(catalog, Duration::from_secs(10)).await);
    }

    write_reports(&args, &all_results, start_time)?;

    if all_results.iter().any(|r| !r.passed) {
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
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎮 Negotiator Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        scenarios.extend(list_scenarios().into_iter().map(|(key, _)| key.to_string()));
    }
    scenarios
}

fn build_loader(args: &Args) -> Result<JsonDataLoader> {
    Ok(JsonDataLoader {
        catalog_json: read_optional(args.catalog.as_deref())?,
        config_json: read_optional(args.config.as_deref())?,
    })
}

fn run_logic_scenarios(
    args: &Args,
    scenarios: &[String],
    seeds: &[u64],
    game_tester: &GameTester,
) -> Vec<logic::ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let logic_tester = LogicTester::new(game_tester.clone());
    let mut results = Vec::new();
    for scenario_name in scenarios {
        if let Some(scenario) = get_scenario(scenario_name) {
            results.extend(logic_tester.run_scenario(&scenario, seeds, args.iterations));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }
    results
}

fn write_reports(
    args: &Args,
    results: &[logic::ScenarioResult],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            logic::reports::generate_json_report(&mut output_target, results)?;
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Negotiator Logic Test Results\n\n_No scenarios executed._"
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
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
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
    use negotiator_game::ScenarioCatalog;

    fn base_args() -> Args {
        Args {
            scenarios: "best-path".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            iterations: 1,
            report: "json".to_string(),
            verbose: false,
            output: None,
            realtime: false,
            catalog: None,
            config: None,
        }
    }

    fn temp_file(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "negotiator-main-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn expand_scenarios_replaces_all() {
        let expanded = expand_scenarios("all");
        assert_eq!(expanded.len(), list_scenarios().len());
        assert!(expanded.contains(&"best-path".to_string()));

        let single = expand_scenarios("worst-path, restart-midway");
        assert_eq!(single, vec!["worst-path", "restart-midway"]);
    }

    #[test]
    fn list_scenarios_writes_to_output_file() {
        let path = temp_file("list");
        let mut args = base_args();
        args.list_scenarios = true;
        args.output = Some(path.clone());
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Available scenarios:"));
        assert!(content.contains("  best-path"));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn markdown_report_written_for_logic_run() {
        let path = temp_file("markdown");
        let mut args = base_args();
        args.report = "markdown".to_string();
        args.output = Some(path.clone());

        let tester = GameTester::new(build_loader(&args).unwrap(), false);
        let results = run_logic_scenarios(&args, &expand_scenarios(&args.scenarios), &[1], &tester);
        write_reports(&args, &results, Instant::now()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# Negotiator Logic Test Results"));
        assert!(content.contains("✅ best-path (seed 1)"));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn config_override_is_loaded_from_file() {
        let path = temp_file("config");
        std::fs::write(&path, r#"{"default_team_name":"Harbor Accord"}"#).unwrap();
        let mut args = base_args();
        args.config = Some(path.clone());

        let loader = build_loader(&args).unwrap();
        assert_eq!(loader.load_config().unwrap().default_team_name, "Harbor Accord");
        assert!(loader.catalog_json.is_none());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn realtime_check_passes_on_builtin_catalog() {
        let result = tokio_test::block_on(run_realtime_check(
            ScenarioCatalog::builtin(),
            Duration::from_secs(10),
        ));
        assert!(result.passed, "{:?}", result.failures);
    }
}
