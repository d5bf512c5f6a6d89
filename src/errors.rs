use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpaeError {
    #[error("bundled file not found: {0}")]
    AssetNotFound(PathBuf),

    #[error("cannot locate the spae pipeline directory: {0}")]
    AssetRoot(String),

    #[error("config error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid --snake-default value {value:?}: {reason}")]
    SnakeDefault { value: String, reason: String },

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("snakemake failed with exit code {0}")]
    EngineExit(i32),
}

impl SpaeError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a config error for a file.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type SpaeResult<T> = Result<T, SpaeError>;
