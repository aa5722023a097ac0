use std::fmt;
use thiserror::Error;

/// Which of the two execution bounds was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutKind {
    /// Total wall-clock runtime exceeded.
    Total,
    /// No subprocess output within the idle window.
    Idle,
}

impl fmt::Display for TimeoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeoutKind::Total => write!(f, "total"),
            TimeoutKind::Idle => write!(f, "idle"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid argument: [{option}] has to be {expected}")]
    InvalidArgument { option: String, expected: String },

    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Command exceeded {kind} timeout of {secs}s")]
    Timeout { kind: TimeoutKind, secs: u64 },

    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_argument(option: &str, expected: &str) -> Self {
        Error::InvalidArgument {
            option: option.to_string(),
            expected: expected.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Error::MissingParameter(_) => "MISSING_PARAMETER",
            Error::Timeout { .. } => "TIMEOUT",
            Error::Spawn { .. } => "SPAWN_FAILED",
            Error::Io(_) => "IO_ERROR",
            Error::Yaml(_) => "YAML_ERROR",
        }
    }
}
