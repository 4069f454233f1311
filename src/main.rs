// src/main.rs

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

use jittester::ir::Node;
use jittester::{describe_hierarchy, generate_program, get_profile};

/// Random Java program generator for fuzz-testing JIT compilers
#[derive(Parser)]
#[command(name = "jittester")]
#[command(version = "0.1.0")]
#[command(about = "Generate a random, well-typed Java program tree", long_about = None)]
struct Cli {
    /// Seed for the random source; derived from the clock when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Profile name or path to a .toml profile
    #[arg(long, value_name = "NAME|PATH", default_value = "default")]
    profile: String,

    /// Write the generated tree as JSON
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the class hierarchy
    #[arg(long)]
    print_hierarchy: bool,
}

/// A timer that outputs nothing
struct NoTimestamp;

impl FormatTime for NoTimestamp {
    fn format_time(
        &self,
        _w: &mut tracing_subscriber::fmt::format::Writer<'_>,
    ) -> std::fmt::Result {
        Ok(())
    }
}

fn init_tracing() {
    // JITTESTER_LOG_STYLE: "compact" (default) or "full" (with timestamps)
    let filter = EnvFilter::try_from_env("JITTESTER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let style = std::env::var("JITTESTER_LOG_STYLE").unwrap_or_default();
    if style == "full" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_timer(NoTimestamp)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let params = match get_profile(&cli.profile) {
        Ok(params) => params,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };
    let seed = cli.seed.unwrap_or_else(clock_seed);

    let program = match generate_program(seed, params) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("error: seed {seed}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let classes = program.classes.as_ref().map_or(0, |c| c.definitions.len());
    println!("seed:       {seed}");
    println!("classes:    {classes}");
    println!("complexity: {}", program.complexity());
    println!("depth:      {}", program.depth());

    if cli.print_hierarchy {
        print!("{}", describe_hierarchy(&program));
    }

    if let Some(path) = &cli.output {
        let json = match serde_json::to_string_pretty(&program) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("error: failed to serialize program: {e}");
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = std::fs::write(path, json) {
            eprintln!("error: failed to write '{}': {e}", path.display());
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
