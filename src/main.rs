use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use dental_trainer::procedure::PropAnimation;
use dental_trainer::scenario::{HostEvent, HostEventKind};
use dental_trainer::{
    init_telemetry, RunOptions, Scenario, ScenarioReport, ScenarioRunner, TrainerConfig,
};

#[derive(Parser)]
#[command(name = "dental-trainer")]
#[command(about = "Headless runner for the VR dental extraction and implant procedure")]
#[command(long_about = "Drives the procedure state machine with scripted operator actions. \
                       Get started with 'dental-trainer demo' to watch a full procedure.")]
struct Cli {
    /// Configuration file to load instead of dental-trainer.toml
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    config: Option<PathBuf>,

    /// Log level filter, overrides the configuration
    #[arg(long, global = true, help = "Log level: trace, debug, info, warn, error")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file tick by tick
    Run {
        /// Scenario TOML file
        scenario: PathBuf,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Run the built-in happy-path scenario
    Demo {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args)]
struct RunArgs {
    /// Tick length in seconds
    #[arg(long, help = "Fixed tick length in seconds (default from scenario or config)")]
    tick: Option<f32>,
    /// Seed for target tooth selection
    #[arg(long, help = "Seed for random tooth selection")]
    seed: Option<u64>,
    /// Print the final report as JSON instead of the transcript
    #[arg(long, help = "Emit the final report as JSON")]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    TrainerConfig::load_env_file()?;
    let config = match &cli.config {
        Some(path) => TrainerConfig::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => dental_trainer::config()?.clone(),
    };

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.observability.log_level.clone());
    init_telemetry(&level, config.observability.json)?;

    match cli.command {
        Commands::Run { scenario, run } => {
            let scenario = Scenario::from_file(&scenario)?;
            run_scenario(scenario, &config, run)
        }
        Commands::Demo { run } => run_scenario(Scenario::demo()?, &config, run),
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn run_scenario(scenario: Scenario, config: &TrainerConfig, args: RunArgs) -> Result<()> {
    let options = RunOptions {
        tick_seconds: args.tick,
        seed: args.seed,
    };

    if !args.json {
        println!("🦷 Scenario: {}", scenario.name);
        if let Some(description) = &scenario.description {
            println!("   {description}");
        }
        println!();
    }

    let mut runner = ScenarioRunner::new(scenario, config, options)?;
    let report = runner.run()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_transcript(&report);
    }
    Ok(())
}

fn print_transcript(report: &ScenarioReport) {
    let mut last_bucket: Option<i32> = None;
    let mut turning = false;
    for HostEvent { at, kind } in &report.events {
        match kind {
            HostEventKind::Instruction { text } => {
                last_bucket = None;
                turning = false;
                let mut lines = text.lines();
                if let Some(first) = lines.next() {
                    println!("[{at:7.2}s] 📋 {first}");
                }
                for line in lines {
                    println!("            {line}");
                }
            }
            HostEventKind::Progress { text, fraction } => {
                // one line per 25% so long tasks stay readable
                let bucket = (fraction * 4.0).floor() as i32;
                if last_bucket != Some(bucket) {
                    last_bucket = Some(bucket);
                    println!("[{at:7.2}s] ⏳ {text} ({:.0}%)", fraction * 100.0);
                }
            }
            HostEventKind::Indicator { color, label, .. } => {
                println!("[{at:7.2}s] 🎨 Socket indicator: {label} ({color:?})");
            }
            HostEventKind::Spawn { kind, handle, .. } => {
                println!("[{at:7.2}s] ➕ Spawned {kind:?} ({handle})");
            }
            HostEventKind::Destroy { handle } => {
                println!("[{at:7.2}s] ➖ Removed {handle}");
            }
            HostEventKind::Animate {
                handle,
                animation: PropAnimation::ScrewIn { .. },
            } => {
                // the screw turns every tick; show only the first turn after each instruction
                if !turning {
                    turning = true;
                    println!("[{at:7.2}s] 🎬 Screwing in {handle}");
                }
            }
            HostEventKind::Animate { handle, animation } => {
                println!("[{at:7.2}s] 🎬 {animation:?} on {handle}");
            }
            HostEventKind::Note { text } => {
                println!("[{at:7.2}s] ⚠️  {text}");
            }
        }
    }

    println!();
    let status = &report.status;
    if report.completed {
        println!(
            "✅ Procedure complete in {:.2}s ({} ticks)",
            report.simulated_seconds, report.ticks
        );
    } else {
        println!(
            "⏸️  Stopped at {} after {:.2}s ({} ticks)",
            status.step, report.simulated_seconds, report.ticks
        );
    }
    if let Some(tooth) = &status.target {
        println!("   Tooth: {tooth}");
    }
    println!("   Overall progress: {:.0}%", status.overall_progress * 100.0);
}
