//! CLI entry point for the cube solver.
//!
//! Usage:
//!   cube-solver solve --state <FACELETS> [options]
//!
//! Options:
//!   --order <ORDER>          Face order of the state string (default: URFDLB)
//!   --colormap <MAP>         Side to color map, e.g. U:W,R:R,F:G,D:Y,L:O,B:B
//!   --fast/--normal/--slow   Search effort (default: fast)
//!   --print-steps            Show the cube after every replayed move
//!   --no-comments            Export the solution without stage comments
//!   --seed-solution <MOVES>  Moves to start from, in reverse order
//!   --openwith <MOVES>       Moves applied to the cube before solving
//!   --tables <DIR>           Directory holding lookup tables
//!   --heuristic-stats        Collect heuristic samples if the search gives up
//!   --debug                  Verbose logging

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

use cube_solver::config::DEFAULT_ORDER;
use cube_solver::{
    build_engine, invert_sequence, parse_moves, resolve, Orchestrator, Outcome, PerformanceFlags,
    RunOptions, SolveError, SolveRequest, TracingSink,
};

#[derive(Parser)]
#[command(name = "cube-solver")]
#[command(about = "Bounded, self-verifying solver for NxN cubes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a cube and verify the solution by replay
    Solve {
        /// Facelet colors, face by face in --order
        #[arg(long)]
        state: String,

        /// Face order of the state string
        #[arg(long, default_value = DEFAULT_ORDER)]
        order: String,

        /// Side to color map, e.g. U:W,R:R,F:G,D:Y,L:O,B:B
        #[arg(long)]
        colormap: Option<String>,

        /// Shortest search bound
        #[arg(long)]
        fast: bool,

        /// Medium search bound
        #[arg(long)]
        normal: bool,

        /// Deepest search bound
        #[arg(long)]
        slow: bool,

        /// Show the cube after every replayed move
        #[arg(long)]
        print_steps: bool,

        /// Export the solution without stage comments
        #[arg(long)]
        no_comments: bool,

        /// Moves to start from, in reverse application order
        #[arg(long, value_name = "MOVES")]
        seed_solution: Option<String>,

        /// Moves applied to the cube before solving
        #[arg(long, value_name = "MOVES")]
        openwith: Option<String>,

        /// Directory holding lookup tables
        #[arg(long, value_name = "DIR")]
        tables: Option<PathBuf>,

        /// Collect heuristic samples when the search bound is exhausted
        #[arg(long)]
        heuristic_stats: bool,

        /// Verbose logging
        #[arg(long)]
        debug: bool,
    },
}

/// Output format for a solve
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    solution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    export: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    move_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    canonical_encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    heuristic_medians: Option<BTreeMap<String, i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<&'static str>,
    time_elapsed_ms: u64,
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            state,
            order,
            colormap,
            fast,
            normal,
            slow,
            print_steps,
            no_comments,
            seed_solution,
            openwith,
            tables,
            heuristic_stats,
            debug,
        } => {
            init_logging(debug);
            let started = Instant::now();

            // Any flag given switches off the implicit fast default
            let flags = if fast || normal || slow {
                PerformanceFlags { fast, normal, slow }
            } else {
                PerformanceFlags::default()
            };
            let options = RunOptions {
                trace_steps: print_steps,
                comments: !no_comments,
            };
            let comments = options.comments;

            let result = run_solve(
                state,
                order,
                colormap,
                flags,
                seed_solution.as_deref(),
                openwith.as_deref(),
                tables,
                heuristic_stats,
                options,
            );
            let status = exit_status(result.as_ref().map(|(_, outcome)| outcome));
            let mut output = match result {
                Ok((header, outcome)) => describe_outcome(header, outcome, comments),
                Err(err) => {
                    error!(kind = err.kind(), "{}", err);
                    failed_output(&err)
                }
            };
            output.time_elapsed_ms = started.elapsed().as_millis() as u64;

            match serde_json::to_string_pretty(&output) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error serializing output: {}", e);
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::from(status)
        }
    }
}

/// 0 for a verified solve or a calibration run, 1 for any failure
fn exit_status(result: Result<&Outcome, &SolveError>) -> u8 {
    match result {
        Ok(Outcome::Solved(_)) | Ok(Outcome::Calibrated(_)) => 0,
        Err(_) => 1,
    }
}

fn describe_outcome(mut output: SolveOutput, outcome: Outcome, comments: bool) -> SolveOutput {
    match outcome {
        Outcome::Solved(report) => {
            output.status = "solved";
            output.solution = Some(report.solution.to_notation());
            output.export = Some(report.solution.export(comments));
            output.move_count = Some(report.solution.len());
            output.canonical_encoding = Some(report.initial_encoding);
        }
        Outcome::Calibrated(report) => {
            output.status = "calibrated";
            output.heuristic_medians = Some(report.medians);
        }
    }
    output
}

fn failed_output(err: &SolveError) -> SolveOutput {
    SolveOutput {
        status: "failed",
        error: Some(err.to_string()),
        error_kind: Some(err.kind()),
        ..Default::default()
    }
}

#[allow(clippy::too_many_arguments)]
fn run_solve(
    state: String,
    order: String,
    colormap: Option<String>,
    flags: PerformanceFlags,
    seed_solution: Option<&str>,
    openwith: Option<&str>,
    tables: Option<PathBuf>,
    heuristic_stats: bool,
    options: RunOptions,
) -> Result<(SolveOutput, Outcome), SolveError> {
    let openwith = openwith.map(parse_moves).transpose()?.unwrap_or_default();
    // Seeds are written in reverse order, as an undo list
    let seed = match seed_solution {
        Some(text) => invert_sequence(&parse_moves(text)?),
        None => Vec::new(),
    };

    let request = SolveRequest {
        state,
        order,
        colormap,
        flags,
        openwith,
        tables_dir: tables,
        collect_heuristic_stats: heuristic_stats,
    };
    let resolved = resolve(&request)?;
    let engine = build_engine(resolved.variant, resolved.state, resolved.engine)?;

    let sink = TracingSink::new(options.trace_steps);
    let mut orchestrator = Orchestrator::new(engine, sink, options.clone());
    let outcome = orchestrator.run(&seed)?;

    let header = SolveOutput {
        size: Some(resolved.size),
        engine: Some(resolved.variant.name()),
        mode: Some(resolved.mode.to_string()),
        ..Default::default()
    };
    Ok((header, outcome))
}
