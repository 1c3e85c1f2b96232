//! Error types for the draftflow runner.
//!
//! Configuration and validation errors are raised before any step runs.
//! Step execution errors never escape the executor; they are recorded in the
//! run trace and converted to `Absent` outputs for downstream steps.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for draftflow operations.
#[derive(Debug, Error)]
pub enum DraftflowError {
    /// The step graph is malformed.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// The caller supplied inputs the pipeline does not declare.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DuplicateWriteError> for DraftflowError {
    fn from(err: DuplicateWriteError) -> Self {
        Self::Configuration(ConfigurationError::DuplicateWrite(err))
    }
}

/// Metadata about a configuration error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "CONFIG-003-CYCLE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Error raised when the step graph cannot be built.
///
/// Every variant is detected once, before any step executes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The pipeline has no steps.
    #[error("Pipeline '{pipeline}' has no steps")]
    EmptyPipeline {
        /// The pipeline name.
        pipeline: String,
    },

    /// A single step descriptor is malformed.
    #[error("Step '{step}' is invalid: {reason}")]
    InvalidStep {
        /// The step name.
        step: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two descriptors share a name.
    #[error("Step name '{step}' is registered more than once")]
    DuplicateStep {
        /// The duplicated name.
        step: String,
    },

    /// More than one descriptor produces the same key.
    #[error("Key '{key}' is produced by both '{first}' and '{second}'")]
    AmbiguousProducer {
        /// The contested key.
        key: String,
        /// The first producer, in declaration order.
        first: String,
        /// The second producer.
        second: String,
    },

    /// An input key is neither an initial input nor produced by any step.
    #[error("Step '{step}' reads '{key}', which is neither an initial input nor produced by any step")]
    UnresolvedInput {
        /// The consuming step.
        step: String,
        /// The unresolved key.
        key: String,
    },

    /// The steps form a directed cycle.
    #[error("{0}")]
    Cycle(#[from] CycleDetectedError),

    /// A key would be written twice: once as an initial input and once by a step.
    #[error("{0}")]
    DuplicateWrite(#[from] DuplicateWriteError),

    /// No terminal key was set.
    #[error("Pipeline '{pipeline}' has no terminal key")]
    MissingTerminal {
        /// The pipeline name.
        pipeline: String,
    },

    /// The terminal key is neither an initial input nor produced by any step.
    #[error("Terminal key '{key}' is neither an initial input nor produced by any step")]
    UnknownTerminal {
        /// The terminal key.
        key: String,
    },
}

impl ConfigurationError {
    /// Returns the stable diagnostic code and fix hint for this error.
    #[must_use]
    pub fn error_info(&self) -> ContractErrorInfo {
        match self {
            Self::EmptyPipeline { pipeline } => {
                ContractErrorInfo::new("CONFIG-000-EMPTY", "Cannot build an empty pipeline")
                    .with_fix_hint("Add at least one step before building.")
                    .with_context_entry("pipeline", pipeline)
            }
            Self::InvalidStep { step, reason } => {
                ContractErrorInfo::new("CONFIG-000-INVALID_STEP", reason.clone())
                    .with_context_entry("step", step)
            }
            Self::DuplicateStep { step } => {
                ContractErrorInfo::new("CONFIG-000-DUPLICATE_STEP", format!("Step '{step}' registered twice"))
                    .with_fix_hint("Give every step a unique name.")
                    .with_context_entry("step", step)
            }
            Self::AmbiguousProducer { key, first, second } => ContractErrorInfo::new(
                "CONFIG-001-AMBIGUOUS",
                format!("Key '{key}' has more than one producer"),
            )
            .with_fix_hint("Rename one of the outputs so every key has exactly one producer.")
            .with_context_entry("key", key)
            .with_context_entry("first", first)
            .with_context_entry("second", second),
            Self::UnresolvedInput { step, key } => ContractErrorInfo::new(
                "CONFIG-002-UNRESOLVED",
                format!("Input '{key}' of step '{step}' has no source"),
            )
            .with_fix_hint("Declare the key as an initial input or add a step that produces it.")
            .with_context_entry("step", step)
            .with_context_entry("key", key),
            Self::Cycle(err) => err.error_info.clone(),
            Self::DuplicateWrite(err) => ContractErrorInfo::new(
                "CONFIG-004-DUPLICATE_WRITE",
                err.to_string(),
            )
            .with_fix_hint("Initial inputs and step outputs must use disjoint keys.")
            .with_context_entry("key", &err.key),
            Self::MissingTerminal { pipeline } => {
                ContractErrorInfo::new("CONFIG-006-MISSING_TERMINAL", "No terminal key set")
                    .with_fix_hint("Call `terminal(key)` with the key whose value is the final result.")
                    .with_context_entry("pipeline", pipeline)
            }
            Self::UnknownTerminal { key } => ContractErrorInfo::new(
                "CONFIG-005-UNKNOWN_TERMINAL",
                format!("Terminal key '{key}' has no source"),
            )
            .with_context_entry("key", key),
        }
    }

    /// Returns the diagnostic code.
    #[must_use]
    pub fn code(&self) -> String {
        self.error_info().code
    }
}

/// Error raised when a cycle is detected in the step graph.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Cycle detected in pipeline: {}", .cycle_path.join(" -> "))]
pub struct CycleDetectedError {
    /// The path of steps forming the cycle, first step repeated at the end.
    pub cycle_path: Vec<String>,
    /// Contract error info.
    pub error_info: ContractErrorInfo,
}

impl CycleDetectedError {
    /// Creates a new cycle detected error.
    #[must_use]
    pub fn new(cycle_path: Vec<String>) -> Self {
        let info = ContractErrorInfo::new(
            "CONFIG-003-CYCLE",
            format!("Steps form a dependency cycle: {}", cycle_path.join(" -> ")),
        )
        .with_fix_hint("Remove one of the shared keys in the cycle to break it.");

        Self {
            cycle_path,
            error_info: info,
        }
    }
}

/// Error raised when writing to a key that is already resolved.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Duplicate write: key '{key}' is already resolved{}", .writer.as_ref().map(|w| format!(" (writer: '{w}')")).unwrap_or_default())]
pub struct DuplicateWriteError {
    /// The conflicting key.
    pub key: String,
    /// The step that attempted the second write, if known.
    pub writer: Option<String>,
}

impl DuplicateWriteError {
    /// Creates a new duplicate write error.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            writer: None,
        }
    }

    /// Records the step that attempted the write.
    #[must_use]
    pub fn with_writer(mut self, writer: impl Into<String>) -> Self {
        self.writer = Some(writer.into());
        self
    }
}

/// Error raised when caller-supplied inputs do not match the pipeline declaration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// An initial input key the pipeline does not declare.
    #[error("Unknown initial input '{key}'; declared inputs: {}", .declared.join(", "))]
    UnknownInput {
        /// The offending key.
        key: String,
        /// The declared initial-input keys.
        declared: Vec<String>,
    },
}

/// A step's transformation rejected.
///
/// Recorded in the trace of the failing step; never returned from `run`.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("Step '{step}' failed: {message}")]
pub struct StepExecutionError {
    /// The failing step.
    pub step: String,
    /// The rendered error chain.
    pub message: String,
}

impl StepExecutionError {
    /// Creates a new step execution error.
    #[must_use]
    pub fn new(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            message: message.into(),
        }
    }

    /// Builds an error from an `anyhow` error, keeping the full cause chain.
    #[must_use]
    pub fn from_anyhow(step: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::new(step, format!("{err:#}"))
    }
}

/// Error raised when a step reads its resolved inputs incorrectly.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputAccessError {
    /// The key was not declared as an input of the step.
    #[error("Step '{step}' attempted to read '{key}', which it did not declare as an input")]
    Undeclared {
        /// The reading step.
        step: String,
        /// The undeclared key.
        key: String,
    },

    /// The key resolved to `Absent` where a value was required.
    #[error("Step '{step}' requires a value for '{key}', but it is absent")]
    Missing {
        /// The reading step.
        step: String,
        /// The absent key.
        key: String,
    },

    /// The payload has a different type than the step expected.
    #[error("Step '{step}' expected {expected} for '{key}', found {found}")]
    TypeMismatch {
        /// The reading step.
        step: String,
        /// The key.
        key: String,
        /// The expected payload kind.
        expected: &'static str,
        /// The actual payload kind.
        found: &'static str,
    },
}
