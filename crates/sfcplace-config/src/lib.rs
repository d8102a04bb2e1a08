//! Configuration system for sfcplace.
//!
//! Load solver configuration from TOML or YAML files to control
//! termination, search strategy, parallelism and diagnostics without code
//! changes.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use sfcplace_config::{SearchType, SolverConfig};
//! use std::time::Duration;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     explain_infeasibility = true
//!
//!     [termination]
//!     seconds_spent_limit = 30
//!
//!     [search]
//!     search_type = "heuristic"
//!     construction_heuristic_type = "first_fit_decreasing"
//! "#).unwrap();
//!
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
//! assert_eq!(config.search.search_type, SearchType::Heuristic);
//! ```
//!
//! Use the default config when the file is missing:
//!
//! ```
//! use sfcplace_config::SolverConfig;
//!
//! let config = SolverConfig::load("solver.toml").unwrap_or_default();
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Default work budget of a single placement feasibility search.
pub const DEFAULT_PLACEMENT_NODE_LIMIT: u64 = 200_000;

/// Default work budget of one conflict-refinement feasibility check.
pub const DEFAULT_CONFLICT_NODE_LIMIT: u64 = 50_000;

/// Main solver configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct SolverConfig {
    /// Random seed for the heuristic local search.
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Number of worker threads for the exhaustive search.
    #[serde(default)]
    pub thread_count: ThreadCount,

    /// Termination configuration.
    #[serde(default)]
    pub termination: Option<TerminationConfig>,

    /// Search strategy configuration.
    #[serde(default)]
    pub search: SearchConfig,

    /// Compute a conflicting constraint subset when the model is infeasible.
    #[serde(default)]
    pub explain_infeasibility: bool,

    /// Work budget of each feasibility check during conflict refinement.
    #[serde(default)]
    pub conflict_node_limit: Option<u64>,

    /// Re-check every returned placement against the scenario invariants.
    #[serde(default)]
    pub assert_solution: bool,
}

impl SolverConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file, TOML unless the extension says YAML.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist or cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that parse but cannot drive a solve.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thread_count == ThreadCount::Count(0) {
            return Err(ConfigError::Invalid(
                "thread_count must be at least 1".to_string(),
            ));
        }
        if self.search.placement_node_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "search.placement_node_limit must be positive".to_string(),
            ));
        }
        if self.search.split_depth.is_some_and(|d| d > MAX_SPLIT_DEPTH) {
            return Err(ConfigError::Invalid(format!(
                "search.split_depth must not exceed {MAX_SPLIT_DEPTH}"
            )));
        }
        Ok(())
    }

    /// Sets the termination time limit.
    pub fn with_termination_seconds(mut self, seconds: u64) -> Self {
        self.termination = Some(TerminationConfig {
            seconds_spent_limit: Some(seconds),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Sets the termination time limit with millisecond precision.
    pub fn with_termination_millis(mut self, millis: u64) -> Self {
        self.termination = Some(TerminationConfig {
            millis_spent_limit: Some(millis),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Sets the explored-node limit.
    pub fn with_node_count_limit(mut self, limit: u64) -> Self {
        self.termination = Some(TerminationConfig {
            node_count_limit: Some(limit),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Sets the search type.
    pub fn with_search_type(mut self, search_type: SearchType) -> Self {
        self.search.search_type = search_type;
        self
    }

    /// Sets the worker thread count.
    pub fn with_thread_count(mut self, thread_count: ThreadCount) -> Self {
        self.thread_count = thread_count;
        self
    }

    /// Enables conflict refinement on infeasible models.
    pub fn with_explain_infeasibility(mut self, explain: bool) -> Self {
        self.explain_infeasibility = explain;
        self
    }

    /// Returns the termination time limit, if configured.
    ///
    /// Convenience method that delegates to `termination.time_limit()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sfcplace_config::SolverConfig;
    /// use std::time::Duration;
    ///
    /// let config = SolverConfig::from_toml_str(r#"
    ///     [termination]
    ///     seconds_spent_limit = 2
    ///     millis_spent_limit = 500
    /// "#).unwrap();
    ///
    /// assert_eq!(config.time_limit(), Some(Duration::from_millis(2_500)));
    /// ```
    pub fn time_limit(&self) -> Option<Duration> {
        self.termination.as_ref().and_then(|t| t.time_limit())
    }

    /// Returns the explored-node limit, if configured.
    pub fn node_count_limit(&self) -> Option<u64> {
        self.termination.as_ref().and_then(|t| t.node_count_limit)
    }

    /// Work budget of one conflict-refinement feasibility check.
    pub fn conflict_node_limit(&self) -> u64 {
        self.conflict_node_limit
            .unwrap_or(DEFAULT_CONFLICT_NODE_LIMIT)
    }
}

/// Worker thread count configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadCount {
    /// One worker per available CPU core.
    #[default]
    Auto,

    /// Sequential search on the calling thread.
    None,

    /// Specific number of workers.
    Count(usize),
}

impl ThreadCount {
    /// Resolves the thread count to an actual number, capped by `work_items`.
    pub fn resolve(&self, work_items: usize) -> usize {
        let wanted = match self {
            ThreadCount::Auto => std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1),
            ThreadCount::None => 1,
            ThreadCount::Count(n) => *n,
        };
        wanted.min(work_items).max(1)
    }
}

impl std::fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreadCount::Auto => write!(f, "Auto"),
            ThreadCount::None => write!(f, "None"),
            ThreadCount::Count(n) => write!(f, "{}", n),
        }
    }
}

/// Termination configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct TerminationConfig {
    /// Maximum seconds to spend solving.
    pub seconds_spent_limit: Option<u64>,

    /// Additional milliseconds to spend solving.
    pub millis_spent_limit: Option<u64>,

    /// Maximum number of explored search nodes.
    pub node_count_limit: Option<u64>,
}

impl TerminationConfig {
    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        let millis =
            self.seconds_spent_limit.unwrap_or(0) * 1_000 + self.millis_spent_limit.unwrap_or(0);
        if millis > 0 {
            Some(Duration::from_millis(millis))
        } else {
            None
        }
    }
}

/// Largest admission-tree split depth (2^depth work units).
pub const MAX_SPLIT_DEPTH: usize = 12;

/// Split depth used when none is configured.
pub const DEFAULT_SPLIT_DEPTH: usize = 4;

/// Local search steps used when no limit is configured.
pub const DEFAULT_LOCAL_SEARCH_STEP_LIMIT: u64 = 500;

/// Search strategy configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct SearchConfig {
    /// Exact branch-and-bound or heuristic search.
    #[serde(default)]
    pub search_type: SearchType,

    /// Admission order of the construction phase.
    #[serde(default)]
    pub construction_heuristic_type: ConstructionHeuristicType,

    /// Local search steps in heuristic mode.
    pub local_search_step_limit: Option<u64>,

    /// Work budget of a single placement feasibility search.
    pub placement_node_limit: Option<u64>,

    /// Depth at which the admission tree is split into parallel work units.
    pub split_depth: Option<usize>,
}

impl SearchConfig {
    /// Work budget of a single placement feasibility search.
    pub fn placement_node_limit(&self) -> u64 {
        self.placement_node_limit
            .unwrap_or(DEFAULT_PLACEMENT_NODE_LIMIT)
    }

    /// Admission-tree split depth, capped at [`MAX_SPLIT_DEPTH`].
    pub fn split_depth(&self) -> usize {
        self.split_depth
            .unwrap_or(DEFAULT_SPLIT_DEPTH)
            .min(MAX_SPLIT_DEPTH)
    }

    pub fn local_search_step_limit(&self) -> u64 {
        self.local_search_step_limit
            .unwrap_or(DEFAULT_LOCAL_SEARCH_STEP_LIMIT)
    }
}

/// Search types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// Complete branch and bound over admission decisions.
    #[default]
    BranchAndBound,

    /// Greedy construction followed by local search; never proves optimality.
    Heuristic,
}

/// Construction heuristic types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionHeuristicType {
    /// Try chains in document order.
    #[default]
    FirstFit,

    /// Try chains by increasing total resource demand.
    FirstFitDecreasing,
}
