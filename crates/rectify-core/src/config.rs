//! Configuration handling for rectify.
//!
//! Configuration lives in `rectify.toml`:
//!
//! ```toml
//! [engine]
//! max_passes = 10
//! max_depth = 512
//! workers = 0
//!
//! [paths]
//! include = ["**/*.json"]
//!
//! [[rule]]
//! name = "AddInterfaceByParentRector"
//! [rule.options]
//! SomeParent = "SomeInterface"
//! ```
//!
//! `[[rule]]` entries are registered in file order. CLI flags override
//! `[engine]` values (see [`CliOverrides`]).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::rule::Configuration;

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "rectify.toml";

/// Default pass ceiling of the fixpoint controller.
pub const DEFAULT_MAX_PASSES: usize = 10;

/// Default recursion ceiling of the traversal engine.
pub const DEFAULT_MAX_DEPTH: usize = 512;

// ============================================================================
// Engine Options
// ============================================================================

/// Knobs of the traversal engine, fixpoint controller and batch runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Maximum passes over one tree before giving up on convergence.
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,

    /// Maximum tree depth before the walk fails with a structural error.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Worker threads for batches (0 = one per core).
    #[serde(default)]
    pub workers: usize,
}

fn default_max_passes() -> usize {
    DEFAULT_MAX_PASSES
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            max_passes: DEFAULT_MAX_PASSES,
            max_depth: DEFAULT_MAX_DEPTH,
            workers: 0,
        }
    }
}

impl EngineOptions {
    /// Set the pass ceiling.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Set the depth ceiling.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_passes == 0 {
            return Err(EngineError::Config(
                "engine.max_passes must be at least 1".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(EngineError::Config(
                "engine.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Rule Selection
// ============================================================================

/// One `[[rule]]` entry: which rule to enable and how to configure it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Short (`AddInterfaceByParentRector`) or fully qualified rule name.
    pub name: String,
    /// Options handed to the rule's constructor.
    #[serde(default)]
    pub options: Configuration,
}

impl RuleSpec {
    /// Enable a rule without options.
    pub fn new(name: impl Into<String>) -> Self {
        RuleSpec {
            name: name.into(),
            options: Configuration::new(),
        }
    }

    /// Attach options.
    pub fn with_options(mut self, options: Configuration) -> Self {
        self.options = options;
        self
    }
}

// ============================================================================
// Paths
// ============================================================================

/// Which files a directory argument expands to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Glob patterns of files to process.
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Glob patterns of files to skip.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_include() -> Vec<String> {
    vec!["**/*.json".to_string()]
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            include: default_include(),
            exclude: Vec::new(),
        }
    }
}

// ============================================================================
// Top-level Config
// ============================================================================

/// Contents of `rectify.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineOptions,

    #[serde(default)]
    pub paths: PathsConfig,

    /// Enabled rules, in registration order.
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleSpec>,
}

/// Values supplied on the command line; they win over the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub max_passes: Option<usize>,
    pub max_depth: Option<usize>,
    pub workers: Option<usize>,
}

impl Config {
    /// Parse and validate configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self, EngineError> {
        let config: Config = toml::from_str(content)
            .map_err(|e| EngineError::Config(format!("failed to parse config file: {}", e)))?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let content = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Load `rectify.toml` from `dir`, or defaults if there is none.
    pub fn load_from_dir(dir: &Path) -> Result<Self, EngineError> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Apply command-line overrides and re-validate.
    pub fn apply_overrides(&mut self, overrides: &CliOverrides) -> Result<(), EngineError> {
        if let Some(max_passes) = overrides.max_passes {
            self.engine.max_passes = max_passes;
        }
        if let Some(max_depth) = overrides.max_depth {
            self.engine.max_depth = max_depth;
        }
        if let Some(workers) = overrides.workers {
            self.engine.workers = workers;
        }
        self.engine.validate()
    }
}

// ============================================================================
// Tests
// ============================================================================
