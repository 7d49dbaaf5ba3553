mod backend;
mod common;
mod logic;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use lottogen_core::HttpConfig;
use lottogen_core::constants::DEFAULT_REQUEST_TIMEOUT_MS;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use common::scenario::{ScenarioCtx, get_scenario, list_scenarios, scenario_names};
use common::split_csv;
use logic::{ScenarioResult, ScenarioRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// In-process seeded server (fast, deterministic)
    Offline,
    /// Real generation API at --base-url
    Live,
}

#[derive(Debug, Parser)]
#[command(name = "lottogen-tester", version)]
#[command(about = "Scenario driver for the lottogen generation workflow - offline or against a live API")]
struct Args {
    /// Backend: offline (seeded in-process server) or live (HTTP API)
    #[arg(long, value_enum, default_value_t = RunMode::Offline)]
    mode: RunMode,

    /// Base URL of the generation API (live mode only)
    #[arg(long, env = "LOTTOGEN_BASE_URL", default_value = "http://localhost:8000")]
    base_url: String,

    /// Scenarios to run (comma-separated, or "all")
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Seed for the offline server and local draws
    #[arg(long, default_value_t = 1337)]
    seed: u64,

    /// Request timeout for live mode
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner(&args);

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios);
    let ctx = build_ctx(&args)?;
    let results = run_scenarios(&args, &scenarios, &ctx).await;

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
        writeln!(output_target.writer(), "  {key:20} - {description}")?;
    }
    output_target.finish()?;
    Ok(true)
}

fn announce_banner(args: &Args) {
    println!("{}", "🎰 Lottogen Scenario Tester".bright_cyan().bold());
    println!("{}", "===========================".cyan());
    match args.mode {
        RunMode::Offline => println!("Backend: offline (seed {})", args.seed),
        RunMode::Live => println!("Backend: live ({})", args.base_url),
    }
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for name in scenario_names() {
            if !scenarios.contains(&name) {
                scenarios.push(name);
            }
        }
    }
    scenarios
}

fn build_ctx(args: &Args) -> Result<ScenarioCtx> {
    let live = (args.mode == RunMode::Live)
        .then(|| HttpConfig::new(args.base_url.clone()).with_timeout_ms(args.timeout_ms));
    let transport = backend::shared_transport(live, args.seed)
        .context("failed to prepare the generation backend")?;
    Ok(ScenarioCtx::new(
        transport,
        args.seed,
        args.verbose,
        args.mode == RunMode::Live,
    ))
}

async fn run_scenarios(
    args: &Args,
    scenarios: &[String],
    ctx: &ScenarioCtx,
) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Scenarios".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let runner = ScenarioRunner::new(args.verbose);
    let mut results = Vec::new();
    for name in scenarios {
        match get_scenario(name) {
            Some(scenario) => results.push(runner.run(scenario, ctx).await),
            None => eprintln!("⚠️  Unknown scenario: {}", name.yellow()),
        }
    }
    results
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(output_target.writer(), "[]")?;
            } else {
                logic::reports::generate_json_report(output_target.writer(), results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    output_target.writer(),
                    "# Lottogen Scenario Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(output_target.writer(), results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(output_target.writer(), "No scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    output_target.writer(),
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(output_target.writer())?;
            writeln!(
                output_target.writer(),
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }

    output_target.finish()?;
    Ok(())
}

/// Report sink: stdout unless `--output` names a file.
struct OutputTarget {
    inner: Box<dyn Write>,
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        let inner: Box<dyn Write> = match path {
            Some(path) => {
                let file = File::create(&path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(BufWriter::new(stdout())),
        };
        Ok(Self { inner })
    }

    fn writer(&mut self) -> &mut dyn Write {
        self.inner.as_mut()
    }

    fn finish(mut self) -> Result<()> {
        self.inner.flush().context("failed to flush report output")
    }
}
