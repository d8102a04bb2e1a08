//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

use sfcplace::{SearchType, SolverConfig, ThreadCount};

/// Places VNFs and admits as many service function chains as possible.
#[derive(Parser, Debug)]
#[command(name = "sfcplace", version, about, long_about = None)]
pub struct Args {
    /// Scenario document (.json, .yaml or .toml)
    pub input: PathBuf,

    /// Wall-clock limit in seconds; the best placement so far is reported
    #[arg(short = 't', long, value_name = "SECS")]
    pub time_limit: Option<u64>,

    /// Solver configuration file (.toml or .yaml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Worker threads for branch-and-bound; 1 searches sequentially
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Use the local search instead of proving optimality
    #[arg(long)]
    pub heuristic: bool,

    /// Compute a conflicting constraint subset when infeasible
    #[arg(long)]
    pub explain: bool,

    /// Re-check the placement against the scenario before reporting it
    #[arg(long)]
    pub assert: bool,

    /// Write the decision model in LP format
    #[arg(long, value_name = "FILE")]
    pub write_model: Option<PathBuf>,

    /// Write the conflict subset in LP format; implies --explain
    #[arg(long, value_name = "FILE")]
    pub write_conflict: Option<PathBuf>,

    /// Write the JSON report here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Single-line JSON
    #[arg(long)]
    pub compact: bool,

    /// No banner or solver progress
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Applies the flags on top of `config`; flags win over file values.
    pub fn apply(&self, mut config: SolverConfig) -> SolverConfig {
        if let Some(seconds) = self.time_limit {
            config = config.with_termination_seconds(seconds);
        }
        if let Some(threads) = self.threads {
            config = config.with_thread_count(match threads {
                0 => ThreadCount::Auto,
                1 => ThreadCount::None,
                n => ThreadCount::Count(n),
            });
        }
        if self.heuristic {
            config = config.with_search_type(SearchType::Heuristic);
        }
        if self.explain || self.write_conflict.is_some() {
            config = config.with_explain_infeasibility(true);
        }
        if self.assert {
            config.assert_solution = true;
        }
        config
    }
}
