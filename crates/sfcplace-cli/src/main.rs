//! `sfcplace` command line tool.
//!
//! Exit codes: 0 when a placement is reported, 2 when there is none
//! (infeasible, or stopped before any was found), 3 for an unbounded
//! objective, 1 for malformed input, bad configuration or I/O failures.

mod args;


use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use owo_colors::OwoColorize;
use thiserror::Error;

use sfcplace::{ModelError, PlacementReport, ResultKind, Scenario, SolveError, SolverConfig};

use args::Args;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Solve(#[from] SolveError),

    #[error("cannot write `{path}`: {source}")]
    Export { path: PathBuf, source: ModelError },

    #[error("cannot write `{path}`: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("cannot serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let args = Args::parse();
    if !args.quiet {
        sfcplace_console::init();
    }

    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{} {err}", "error:".bright_red().bold());
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> Result<u8, CliError> {
    let config = match &args.config {
        Some(path) => SolverConfig::load(path).map_err(SolveError::from)?,
        None => SolverConfig::default(),
    };
    let config = args.apply(config);

    let scenario = Scenario::load(&args.input).map_err(SolveError::from)?;
    let run = sfcplace::run(&scenario, &config)?;

    if let Some(path) = &args.write_model {
        sfcplace::save_lp(&run.model, path).map_err(|source| CliError::Export {
            path: path.clone(),
            source,
        })?;
    }
    if let Some(path) = &args.write_conflict {
        match &run.outcome.conflict {
            Some(conflict) => sfcplace::save_lp_subset(&run.model, conflict, path).map_err(
                |source| CliError::Export {
                    path: path.clone(),
                    source,
                },
            )?,
            None => eprintln!(
                "{} no conflict to write to `{}`",
                "warning:".bright_yellow().bold(),
                path.display()
            ),
        }
    }

    let json = render(&run.report, args.compact)?;
    match &args.output {
        Some(path) => write_file(path, &json)?,
        None => println!("{json}"),
    }

    eprintln!("{}", summary(&run.report));
    Ok(exit_code(&run.report))
}

fn render(report: &PlacementReport, compact: bool) -> Result<String, serde_json::Error> {
    if compact {
        serde_json::to_string(report)
    } else {
        serde_json::to_string_pretty(report)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    fs::File::create(path)
        .and_then(|mut file| {
            file.write_all(contents.as_bytes())?;
            file.write_all(b"\n")
        })
        .map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// One line for stderr.
fn summary(report: &PlacementReport) -> String {
    let total = report.admissions.len();
    match report.kind {
        ResultKind::Infeasible | ResultKind::Unbounded => format!("{}", report.kind),
        kind if !report.has_solution() => format!("{kind}: no placement found"),
        kind => format!(
            "{kind}: admitted {} of {total} chains{}",
            report.admitted_count(),
            if report.proven_optimal { "" } else { " (not proven optimal)" }
        ),
    }
}

fn exit_code(report: &PlacementReport) -> u8 {
    match report.kind {
        ResultKind::Unbounded => 3,
        ResultKind::Infeasible => 2,
        _ if !report.has_solution() => 2,
        _ => 0,
    }
}
