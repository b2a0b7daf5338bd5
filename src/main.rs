//! # Sparse-lapjv CLI
//!
//! Command-line interface for the sparse-lapjv library.
//! Solves sparse linear assignment instances stored as JSON.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use serde::Serialize;

use sparse_lapjv::core::instance::{
    read_batch, read_instance, read_solution, write_json, write_jsonl, Instance, Solution,
};
use sparse_lapjv::{check_solution, Solver, SolverOptions, SparseCostGraph};

mod cli;

/// Command-line interface for sparse-lapjv
#[derive(Parser)]
#[command(name = "sparse-lapjv")]
#[command(about = "Sparse Jonker-Volgenant linear assignment solver")]
#[command(long_about = "Solves minimum-cost perfect matchings on sparse bipartite graphs:
  sparse-lapjv solve instance.json             # Print the optimal assignment as JSON
  sparse-lapjv solve instance.json -o out.json # Write it to a file
  sparse-lapjv batch batch.jsonl --threads 8   # Solve one instance per line in parallel
  sparse-lapjv check instance.json out.json    # Verify a solution's optimality conditions

Instances list the feasible (column, cost) pairs of every row:
  {\"n\": 2, \"rows\": [[[0, 1.0], [1, 3.0]], [[0, 2.0]]]}
Use \"-\" as input to read from stdin.")]
#[command(version = env!("SPARSE_LAPJV_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Start from an empty assignment instead of column reduction
    #[arg(long, global = true)]
    no_column_reduction: bool,

    /// Number of augmenting row reduction passes
    #[arg(long, global = true, default_value_t = 2)]
    arr_passes: usize,

    /// Check complementary slackness on every result
    #[arg(long, global = true)]
    verify: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Solve one JSON instance
    Solve {
        /// Instance file, or "-" for stdin
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Solve a JSON Lines batch in parallel
    Batch {
        /// Batch file with one instance per line, or "-" for stdin
        input: PathBuf,

        /// Output file (default: stdout), one solution per line
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worker threads (default: number of CPUs)
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Check a solution against its instance
    Check {
        /// Instance file
        input: PathBuf,

        /// Solution file produced by `solve`
        solution: PathBuf,
    },
}

/// One line of batch output
#[derive(Serialize)]
#[serde(untagged)]
enum BatchLine {
    Solved(Solution),
    Failed { instance: usize, error: String },
}

impl Cli {
    fn solver_options(&self) -> SolverOptions {
        SolverOptions {
            arr_passes: self.arr_passes,
            column_reduction: !self.no_column_reduction,
            verify: self.verify,
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    if cli.verbose {
        eprintln!("🧮 sparse-lapjv v{} starting...", env!("SPARSE_LAPJV_VERSION"));
    }

    let solver = Solver::with_options(cli.solver_options());
    debug!("solver options: {:?}", solver.options());

    match &cli.command {
        Command::Solve { input, output } => solve_one(&solver, input, output.as_deref()),
        Command::Batch {
            input,
            output,
            threads,
        } => solve_many(&solver, input, output.as_deref(), *threads),
        Command::Check { input, solution } => check(input, solution),
    }
}

/// Open `path` for reading, with "-" meaning stdin
fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if path == Path::new("-") {
        return Ok(Box::new(io::stdin()));
    }
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    Ok(Box::new(file))
}

/// Open `path` for writing, stdout when absent
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

fn solve_one(solver: &Solver, input: &Path, output: Option<&Path>) -> Result<()> {
    let instance = Instance::from_reader(BufReader::new(open_input(input)?))
        .with_context(|| format!("cannot parse instance {}", input.display()))?;
    let graph = instance.to_graph()?;
    info!("instance: n={}, {} edges", graph.n(), graph.num_edges());

    let solution = solver.solve(&graph)?;
    if let Some(path) = output {
        eprintln!("📁 Saving to: {}", path.display());
    }
    write_json(open_output(output)?, &solution)?;
    Ok(())
}

fn solve_many(
    solver: &Solver,
    input: &Path,
    output: Option<&Path>,
    threads: Option<usize>,
) -> Result<()> {
    let instances = read_batch(BufReader::new(open_input(input)?))
        .with_context(|| format!("cannot parse batch {}", input.display()))?;
    let graphs = instances
        .iter()
        .enumerate()
        .map(|(k, instance)| {
            instance
                .to_graph()
                .with_context(|| format!("instance {k} is malformed"))
        })
        .collect::<Result<Vec<SparseCostGraph>>>()?;

    let threads = threads.unwrap_or_else(num_cpus::get).max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("cannot start worker threads")?;

    let progress = cli::ProgressManager::new(
        graphs.len() as u64,
        &format!("🧮 Solving {} instances on {threads} threads", graphs.len()),
    );
    let callback = progress.callback();
    let results = pool.install(|| solver.solve_batch(&graphs, Some(&callback)));
    progress.finish("✅ Batch completed!");

    let mut failed = 0usize;
    let lines: Vec<BatchLine> = results
        .into_iter()
        .enumerate()
        .map(|(k, result)| match result {
            Ok(solution) => BatchLine::Solved(solution),
            Err(e) => {
                failed += 1;
                BatchLine::Failed {
                    instance: k,
                    error: e.to_string(),
                }
            }
        })
        .collect();

    write_jsonl(open_output(output)?, &lines)?;

    if failed > 0 {
        bail!("{failed} of {} instances failed", lines.len());
    }
    Ok(())
}

fn check(input: &Path, solution: &Path) -> Result<()> {
    let graph = read_instance(input)
        .with_context(|| format!("cannot read instance {}", input.display()))?
        .to_graph()?;
    let solution = read_solution(solution)
        .with_context(|| format!("cannot read solution {}", solution.display()))?;
    let state = solution.to_state()?;

    let report = check_solution(&graph, &state);
    println!("Checks run:    {}", report.checks_run);
    println!("Checks passed: {}", report.checks_passed);
    for (i, e) in report.errors.iter().enumerate() {
        println!("  {}. {}", i + 1, e);
    }
    for w in &report.warnings {
        println!("  ⚠ {w}");
    }

    if !report.passed {
        bail!("solution violates {} checks", report.checks_run - report.checks_passed);
    }

    let cost = state.total_cost(&graph)?;
    if (cost - solution.cost).abs() > 1e-9 * cost.abs().max(1.0) {
        bail!("solution reports cost {} but its pairs sum to {cost}", solution.cost);
    }
    println!("✅ Solution is optimal (cost {cost})");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let cli = Cli::try_parse_from(["sparse-lapjv", "solve", "in.json"]).unwrap();
        assert_eq!(cli.solver_options(), SolverOptions::default());
        match cli.command {
            Command::Solve { input, output } => {
                assert_eq!(input, PathBuf::from("in.json"));
                assert!(output.is_none());
            }
            _ => panic!("Expected solve command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sparse-lapjv",
            "batch",
            "in.jsonl",
            "--threads",
            "3",
            "--no-column-reduction",
            "--arr-passes",
            "0",
            "--verify",
        ])
        .unwrap();
        let options = cli.solver_options();
        assert!(!options.column_reduction);
        assert_eq!(options.arr_passes, 0);
        assert!(options.verify);
        match cli.command {
            Command::Batch { threads, .. } => assert_eq!(threads, Some(3)),
            _ => panic!("Expected batch command"),
        }
    }

    #[test]
    fn test_check_requires_two_files() {
        assert!(Cli::try_parse_from(["sparse-lapjv", "check", "in.json"]).is_err());
    }
}
