mod deadlocks;
mod frontier;
mod game;
mod heuristic;
mod hungarian;
mod puzzle;
mod report;
mod solution;
mod solver;
mod state;
mod transition;
mod validator;
mod zobrist;

use clap::{Parser, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::game::Cost;
use crate::heuristic::{AssignmentHeuristic, Heuristic, NearestSwitchHeuristic, NullHeuristic};
use crate::puzzle::Puzzle;
use crate::report::{Report, megabytes, peak_memory_mb, write_report};
use crate::solution::Solution;
use crate::solver::{SolveResult, Solver, SolverOptions, Strategy};
use crate::transition::apply;
use crate::validator::{VerifyError, verify};

#[derive(Debug, Error)]
enum RunError {
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),

    #[error("solution failed verification: {0}")]
    Verify(#[from] VerifyError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HeuristicType {
    /// Minimum-cost assignment of stones to switches (admissible)
    Assignment,
    /// Each stone to its nearest switch
    Nearest,
    /// Always zero
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Bfs,
    Dfs,
    Ucs,
    Astar,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Bfs => Strategy::BreadthFirst,
            StrategyArg::Dfs => Strategy::DepthFirst,
            StrategyArg::Ucs => Strategy::UniformCost,
            StrategyArg::Astar => Strategy::AStar,
        }
    }
}

fn print_solution(puzzle: &Puzzle, solution: &Solution) {
    let grid = puzzle.grid();
    println!("\nStarting position:\n{}", puzzle.start().render(grid));
    let mut state = puzzle.start().clone();
    let mut weight: Cost = 0;
    let mut count = 0;
    let total = solution.pushes();
    for m in &solution.moves {
        let Some(successor) = apply(grid, &state, m.direction()) else {
            break;
        };
        state = successor.state;
        if m.is_push() {
            // The agent now stands where the stone was.
            weight += successor.cost as Cost;
            count += 1;
            println!(
                "Push stone {} {} (weight {}, total {}) ({}/{}):\n{}",
                state.agent(),
                m.direction(),
                successor.cost,
                weight,
                count,
                total,
                state.render(grid)
            );
        }
    }
}

struct RunStats {
    solved: bool,
    steps: usize,
    cost: Cost,
    nodes_expanded: usize,
    elapsed_ms: f64,
}

struct SolveOpts<'a> {
    stem: &'a str,
    strategy: Strategy,
    max_nodes: usize,
    prune_dead_squares: bool,
    output_dir: Option<&'a Path>,
    verify: bool,
    print_solution: bool,
}

fn solve_puzzle_helper<H: Heuristic>(
    puzzle: &Puzzle,
    opts: &SolveOpts,
    heuristic: H,
) -> Result<RunStats, RunError> {
    let options = SolverOptions {
        max_nodes: opts.max_nodes,
        prune_dead_squares: opts.prune_dead_squares,
    };
    let mut solver = Solver::new(
        puzzle.grid(),
        puzzle.start().clone(),
        opts.strategy,
        heuristic,
        options,
    );

    let start = Instant::now();
    let result = solver.solve();
    let elapsed = start.elapsed();
    let memory_mb = megabytes(solver.memory_bytes());

    debug!(
        event = "solve_stats",
        puzzle = opts.stem,
        strategy = %opts.strategy,
        phase = ?solver.phase(),
        generated = solver.nodes_generated(),
        peak_frontier = solver.peak_frontier(),
        process_peak_mb = peak_memory_mb(),
    );

    let (solved, steps, cost) = match &result {
        SolveResult::Solved(solution) => (true, solution.steps(), solution.cost),
        SolveResult::Cutoff => {
            warn!(
                puzzle = opts.stem,
                strategy = %opts.strategy,
                max_nodes = opts.max_nodes,
                "node budget exhausted"
            );
            (false, 0, 0)
        }
        SolveResult::Impossible => (false, 0, 0),
    };

    if opts.verify {
        if let SolveResult::Solved(solution) = &result {
            let replay = verify(puzzle.grid(), puzzle.start(), &solution.to_string())?;
            info!(
                event = "verified",
                puzzle = opts.stem,
                strategy = %opts.strategy,
                weight = replay.cost,
                steps = replay.steps,
                pushes = replay.pushes
            );
        }
    }

    let report = Report {
        strategy: opts.strategy,
        result: &result,
        elapsed,
        memory_mb,
    };
    match opts.output_dir {
        Some(dir) => {
            let path = write_report(dir, opts.stem, &report)?;
            info!(event = "report_written", path = %path.display());
            println!(
                "puzzle: {:<16}  strategy: {:<3}  solved: {}  steps: {:<5}  weight: {:<6}  nodes: {:<10}  elapsed: {:.2} ms",
                opts.stem,
                opts.strategy,
                if solved { 'Y' } else { 'N' },
                steps,
                cost,
                solver.nodes_expanded(),
                elapsed.as_secs_f64() * 1000.0
            );
        }
        None => print!("{}", report),
    }

    if opts.print_solution {
        if let SolveResult::Solved(solution) = &result {
            print_solution(puzzle, solution);
        }
    }

    Ok(RunStats {
        solved,
        steps,
        cost,
        nodes_expanded: solver.nodes_expanded(),
        elapsed_ms: elapsed.as_secs_f64() * 1000.0,
    })
}

fn solve_puzzle(
    puzzle: &Puzzle,
    opts: &SolveOpts,
    heuristic_type: HeuristicType,
) -> Result<RunStats, RunError> {
    match heuristic_type {
        HeuristicType::Assignment => {
            solve_puzzle_helper(puzzle, opts, AssignmentHeuristic::new(puzzle.grid()))
        }
        HeuristicType::Nearest => {
            solve_puzzle_helper(puzzle, opts, NearestSwitchHeuristic::new(puzzle.grid()))
        }
        HeuristicType::Null => solve_puzzle_helper(puzzle, opts, NullHeuristic::new()),
    }
}

#[derive(Parser)]
#[command(name = "ares")]
#[command(about = "A weighted Sokoban solver", long_about = None)]
struct Args {
    /// Puzzle files: a line of stone weights followed by the grid
    #[arg(value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,

    /// Search strategy; repeat to run several (default: all)
    #[arg(short, long = "strategy", value_enum)]
    strategies: Vec<StrategyArg>,

    /// Heuristic used by A*
    #[arg(short = 'H', long, value_enum, default_value = "assignment")]
    heuristic: HeuristicType,

    /// Maximum number of nodes to expand before giving up
    #[arg(short = 'n', long)]
    max_nodes: Option<usize>,

    /// Write result files to DIR/<strategy>/<puzzle>.txt instead of stdout
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Replay every solution and check it reaches the goal
    #[arg(long)]
    verify: bool,

    /// Print the solution push by push
    #[arg(short, long)]
    print_solution: bool,

    /// Skip pushes onto squares from which no switch can be reached
    #[arg(long)]
    prune_dead_squares: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let strategies: Vec<Strategy> = if args.strategies.is_empty() {
        Strategy::ALL.to_vec()
    } else {
        args.strategies.iter().map(|&s| s.into()).collect()
    };
    let max_nodes = args.max_nodes.unwrap_or(usize::MAX);

    let mut failed = false;
    let mut total_runs = 0;
    let mut total_solved = 0;
    let mut total_steps = 0;
    let mut total_cost: Cost = 0;
    let mut total_nodes = 0;
    let mut total_time_ms = 0.0;

    for input in &args.inputs {
        let puzzle = match Puzzle::from_file(input) {
            Ok(puzzle) => puzzle,
            Err(e) => {
                error!(path = %input.display(), "{}", e);
                eprintln!("Error loading {}: {}", input.display(), e);
                failed = true;
                continue;
            }
        };
        let stem = input
            .file_stem()
            .map_or_else(|| "puzzle".into(), |stem| stem.to_string_lossy());
        info!(
            event = "puzzle_loaded",
            puzzle = %stem,
            width = puzzle.grid().width(),
            height = puzzle.grid().height(),
            stones = puzzle.start().stone_count()
        );

        for &strategy in &strategies {
            let opts = SolveOpts {
                stem: &stem,
                strategy,
                max_nodes,
                prune_dead_squares: args.prune_dead_squares,
                output_dir: args.output_dir.as_deref(),
                verify: args.verify,
                print_solution: args.print_solution,
            };
            let stats = match solve_puzzle(&puzzle, &opts, args.heuristic) {
                Ok(stats) => stats,
                Err(e) => {
                    error!(puzzle = %stem, strategy = %strategy, "{}", e);
                    eprintln!("Error solving {} with {}: {}", input.display(), strategy, e);
                    failed = true;
                    continue;
                }
            };

            info!(
                event = "solve_end",
                puzzle = %stem,
                strategy = %strategy,
                solved = stats.solved,
                steps = stats.steps,
                weight = stats.cost,
                nodes = stats.nodes_expanded,
                elapsed_ms = stats.elapsed_ms
            );

            total_runs += 1;
            if stats.solved {
                total_solved += 1;
            }
            total_steps += stats.steps;
            total_cost += stats.cost;
            total_nodes += stats.nodes_expanded;
            total_time_ms += stats.elapsed_ms;
        }
    }

    // Print summary statistics if multiple runs were made
    if total_runs > 1 {
        println!("---");
        println!(
            "solved: {:>3}/{:<3}  steps: {:<6}  weight: {:<8}  nodes: {:<12}  elapsed: {:.2} ms",
            total_solved, total_runs, total_steps, total_cost, total_nodes, total_time_ms
        );
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
