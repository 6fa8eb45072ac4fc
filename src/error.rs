use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HookError {
    #[error("Failed to read stdin: {0}")]
    StdinRead(#[from] io::Error),

    #[error("Failed to parse input JSON: {0}")]
    InputParse(#[from] serde_json::Error),

    #[error("Failed to read config from {path}: {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("Failed to parse config {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("Home directory not found")]
    NoHomeDir,

    #[error("Failed to run `{command}`: {source}")]
    Spawn { command: String, source: io::Error },

    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },
}

pub type Result<T> = std::result::Result<T, HookError>;
