//! Colorful console output for solver events.
//!
//! Provides a `tracing` layer that renders the solver's structured events
//! (solve and phase lifecycle, new incumbents) as colored lines.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (solving/phase start/end)
//! - **DEBUG**: New incumbents
//! - **TRACE**: Pruning decisions and local search steps


use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static SOLVE_START: Mutex<Option<Instant>> = Mutex::new(None);

/// Events from targets with this prefix are rendered.
const SOLVER_TARGET: &str = "sfcplace_solver";

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initializes the console output.
///
/// Safe to call multiple times - only the first call has effect.
/// Prints the banner and installs a subscriber filtered by `RUST_LOG`,
/// defaulting to `sfcplace_solver=info`.
pub fn init() {
    INIT.get_or_init(|| {
        print_banner();

        let filter = EnvFilter::builder()
            .with_default_directive(default_directive())
            .from_env_lossy();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(SolverConsoleLayer)
            .try_init();
    });
}

fn default_directive() -> Directive {
    format!("{SOLVER_TARGET}=info")
        .parse()
        .unwrap_or_else(|_| LevelFilter::INFO.into())
}

fn mark_solve_start() {
    if let Ok(mut start) = SOLVE_START.lock() {
        *start = Some(Instant::now());
    }
}

/// Seconds since the last `solve_start` event.
fn elapsed_secs() -> f64 {
    SOLVE_START
        .lock()
        .ok()
        .and_then(|start| *start)
        .map_or(0.0, |start| start.elapsed().as_secs_f64())
}

fn print_banner() {
    let banner = r#"
         __            _
 ___ / _| ___ _ __ | | __ _  ___ ___
/ __| |_ / __| '_ \| |/ _` |/ __/ _ \
\__ \  _| (__| |_) | | (_| | (_|  __/
|___/_|  \___| .__/|_|\__,_|\___\___|
             |_|
"#;

    let version_line = format!("     v{} - VNF placement and SFC admission\n", VERSION);

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats solver events with colors.
pub struct SolverConsoleLayer;

impl<S: Subscriber> Layer<S> for SolverConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with(SOLVER_TARGET) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Debug, Default)]
struct EventVisitor {
    event: Option<String>,
    phase_name: Option<String>,
    phase_index: Option<u64>,
    steps: Option<u64>,
    step: Option<u64>,
    duration_ms: Option<u64>,
    score: Option<String>,
    best_score: Option<String>,
    final_score: Option<String>,
    kind: Option<String>,
    search_type: Option<String>,
    reason: Option<String>,
    chain_count: Option<u64>,
    variable_count: Option<u64>,
    constraint_count: Option<u64>,
    explored_nodes: Option<u64>,
    feasibility_checks: Option<u64>,
    work_units: Option<u64>,
    threads: Option<u64>,
    complete: Option<bool>,
    accepted: Option<bool>,
}

impl EventVisitor {
    fn set_text(&mut self, name: &str, text: String) {
        match name {
            "event" => self.event = Some(text),
            "phase_name" => self.phase_name = Some(text),
            "score" => self.score = Some(text),
            "best_score" => self.best_score = Some(text),
            "final_score" => self.final_score = Some(text),
            "kind" => self.kind = Some(text),
            "search_type" => self.search_type = Some(text),
            "reason" => self.reason = Some(text),
            _ => {}
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.set_text(field.name(), s.trim_matches('"').to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "phase_index" => self.phase_index = Some(value),
            "steps" => self.steps = Some(value),
            "step" => self.step = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            "chain_count" => self.chain_count = Some(value),
            "variable_count" => self.variable_count = Some(value),
            "constraint_count" => self.constraint_count = Some(value),
            "explored_nodes" => self.explored_nodes = Some(value),
            "feasibility_checks" => self.feasibility_checks = Some(value),
            "work_units" => self.work_units = Some(value),
            "threads" => self.threads = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        match field.name() {
            "score" | "best_score" | "final_score" => {
                self.set_text(field.name(), value.to_string());
            }
            _ => self.record_u64(field, value.max(0) as u64),
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            "complete" => self.complete = Some(value),
            "accepted" => self.accepted = Some(value),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.set_text(field.name(), value.to_string());
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    let event = v.event.as_deref().unwrap_or("");

    match event {
        "solve_start" => format_solve_start(v),
        "solve_end" => format_solve_end(v),
        "phase_start" => format_phase_start(v),
        "phase_end" => format_phase_end(v),
        "new_best" => format_new_best(v),
        "step" | "prune" => format_trace(v, level),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn format_solve_start(v: &EventVisitor) -> String {
    mark_solve_start();
    let chains = v.chain_count.unwrap_or(0);
    let variables = v.variable_count.unwrap_or(0);
    let constraints = v.constraint_count.unwrap_or(0);

    let mut output = format!(
        "{} {} Solving │ {} chains │ {} variables │ {} constraints │ {} admission sets",
        format_elapsed(),
        "▶".bright_green().bold(),
        chains.to_formatted_string(&Locale::en).bright_yellow(),
        variables.to_formatted_string(&Locale::en).bright_yellow(),
        constraints.to_formatted_string(&Locale::en).bright_yellow(),
        admission_space(chains).bright_magenta()
    );
    if let Some(search_type) = &v.search_type {
        output.push_str(&format!(" │ {}", search_type.white()));
    }
    output
}

fn format_solve_end(v: &EventVisitor) -> String {
    let score = v.final_score.as_deref().unwrap_or("none");
    let kind = v.kind.as_deref().unwrap_or("unknown");
    let has_solution = score != "none";

    let status = status_text(kind);
    let status_colored = if has_solution {
        status.bright_green().bold().to_string()
    } else {
        status.bright_red().bold().to_string()
    };

    let mut output = format!(
        "{} {} Solving complete │ {} admitted │ {} nodes │ {} checks │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        format_score(score),
        v.explored_nodes
            .unwrap_or(0)
            .to_formatted_string(&Locale::en)
            .white(),
        v.feasibility_checks
            .unwrap_or(0)
            .to_formatted_string(&Locale::en)
            .white(),
        status_colored
    );

    let inner_width: usize = 58;
    let border = "═".repeat(inner_width);
    output.push_str("\n\n");
    output.push_str(&format!("╔{border}╗").bright_cyan().to_string());
    output.push('\n');

    let total_pad = inner_width.saturating_sub(status.len());
    let left_pad = total_pad / 2;
    let right_pad = total_pad - left_pad;
    output.push_str(&format!(
        "{}{}{}{}{}",
        "║".bright_cyan(),
        " ".repeat(left_pad),
        status_colored,
        " ".repeat(right_pad),
        "║".bright_cyan()
    ));
    output.push('\n');
    output.push_str(&format!("╠{border}╣").bright_cyan().to_string());
    output.push('\n');
    output.push_str(&format!(
        "{}  {:<18}{:>36}  {}",
        "║".bright_cyan(),
        "Admitted chains:",
        score,
        "║".bright_cyan()
    ));
    output.push('\n');
    output.push_str(&format!("╚{border}╝").bright_cyan().to_string());
    output.push('\n');

    output
}

fn status_text(kind: &str) -> &'static str {
    match kind {
        "optimal" => "OPTIMAL PLACEMENT FOUND",
        "timed_out" => "BEST PLACEMENT (NOT PROVEN OPTIMAL)",
        "heuristic" => "HEURISTIC PLACEMENT",
        "infeasible" => "INFEASIBLE (constraints conflict)",
        "unbounded" => "UNBOUNDED (broken objective)",
        _ => "UNKNOWN RESULT",
    }
}

fn format_phase_start(v: &EventVisitor) -> String {
    let phase = v.phase_name.as_deref().unwrap_or("Unknown");

    let mut output = format!(
        "{} {} {} ({}) started",
        format_elapsed(),
        "▶".bright_blue(),
        phase.white().bold(),
        v.phase_index.unwrap_or(0).to_string().yellow()
    );
    if let (Some(units), Some(threads)) = (v.work_units, v.threads) {
        output.push_str(&format!(
            " │ {} work units on {} threads",
            units.to_formatted_string(&Locale::en).bright_yellow(),
            threads.to_string().bright_yellow()
        ));
    }
    output
}

fn format_phase_end(v: &EventVisitor) -> String {
    let phase = v.phase_name.as_deref().unwrap_or("Unknown");
    let steps = v.steps.unwrap_or(0);
    let duration = v.duration_ms.unwrap_or(0);
    let score = v.best_score.as_deref().unwrap_or("none");

    let mut output = format!(
        "{} {} {} ended │ {} │ {} steps │ {}/s",
        format_elapsed(),
        "◀".bright_blue(),
        phase.white().bold(),
        format_duration_ms(duration).yellow(),
        steps.to_formatted_string(&Locale::en).white(),
        per_second(steps, duration)
            .to_formatted_string(&Locale::en)
            .bright_magenta()
            .bold(),
    );
    if v.complete == Some(false) {
        output.push_str(&format!(" │ {}", "incomplete".bright_yellow()));
    }
    output.push_str(&format!(" │ best {}", format_score(score)));
    output
}

fn format_new_best(v: &EventVisitor) -> String {
    let step = v.step.unwrap_or(0);
    let score = v.score.as_deref().unwrap_or("none");

    format!(
        "    {} Node {:>9} │ {} admitted",
        "->".bright_blue(),
        step.to_formatted_string(&Locale::en).white(),
        format_score(score)
    )
}

fn format_trace(v: &EventVisitor, level: Level) -> String {
    if level != Level::TRACE {
        return String::new();
    }
    match (&v.reason, v.accepted) {
        (Some(reason), _) => format!(
            "{} {} pruned ({})",
            format_elapsed(),
            "✂".bright_black(),
            reason.bright_black()
        ),
        (None, Some(accepted)) => format!(
            "{} {} step {} │ {} │ {}",
            format_elapsed(),
            if accepted { "✓".bright_green().to_string() } else { "✗".bright_red().to_string() },
            v.step.unwrap_or(0).to_formatted_string(&Locale::en).white(),
            format_score(v.score.as_deref().unwrap_or("none")),
            if accepted { "accepted" } else { "rejected" }
        ),
        (None, None) => String::new(),
    }
}

fn per_second(count: u64, duration_ms: u64) -> u64 {
    if duration_ms == 0 {
        count.saturating_mul(1000)
    } else {
        count.saturating_mul(1000) / duration_ms
    }
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

fn format_score(score: &str) -> String {
    match score.parse::<i64>() {
        Ok(n) if n > 0 => score.bright_green().to_string(),
        Ok(n) if n < 0 => score.bright_red().to_string(),
        Ok(_) => score.white().to_string(),
        Err(_) => score.bright_red().to_string(),
    }
}

/// Number of admission subsets, `2^chains`, written compactly.
fn admission_space(chains: u64) -> String {
    if chains < 20 {
        return (1u64 << chains).to_formatted_string(&Locale::en);
    }
    let log_scale = (chains as f64) * 2f64.log10();
    let exponent = log_scale.floor() as i32;
    let mantissa = 10f64.powf(log_scale - exponent as f64);
    format!("{:.3} x 10^{}", mantissa, exponent)
}
