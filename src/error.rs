use std::fmt;

/// The four error kinds named by the engine's error-handling design: an
/// input error aborts the CLI, the rest are either recovered locally (with
/// a warning recorded) or escalated by the caller when recovery is not safe.
#[derive(thiserror::Error, Debug)]
pub enum PovuError {
    #[error("input error: {0}")]
    Input(String),

    #[error("invariant violation in {subsystem}: {message}")]
    InvariantViolation { subsystem: String, message: String },

    #[error("capacity breach in {subsystem}: {message}")]
    CapacityBreach { subsystem: String, message: String },

    #[error("worker failed: {0}")]
    Transient(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PovuError>;

/// A recoverable issue surfaced alongside a partial `Ok(..)` result, per the
/// propagation policy in spec.md §7: recovered locally, but never silently
/// dropped.
#[derive(Debug, Clone)]
pub struct PovuWarning {
    pub subsystem: String,
    pub message: String,
}

impl PovuWarning {
    pub fn new(subsystem: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subsystem: subsystem.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for PovuWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.subsystem, self.message)
    }
}
