//! Typed errors for scanning.
//!
//! Document and project failures are values, not panics, so the aggregators
//! can report them and keep going.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    /// File could not be read
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No syntax tree could be produced for a document
    #[error("Parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// A tree was produced but part of it could not be parsed cleanly
    #[error("Syntax error in {}:{line}: {message}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Malformed solution or project descriptor
    #[error("Project error at {}: {message}", path.display())]
    Project { path: PathBuf, message: String },

    /// Invalid configuration file
    #[error("Config error at {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn syntax(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    pub fn project(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Project {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// The file the failure is attributed to.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::Parse { path, .. }
            | Self::Syntax { path, .. }
            | Self::Project { path, .. }
            | Self::Config { path, .. } => path,
        }
    }
}

pub type ScanResult<T> = Result<T, ScanError>;

/// Attach a path to an `io::Error`.
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> ScanResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> ScanResult<T> {
        self.map_err(|e| ScanError::io(path, e))
    }
}
