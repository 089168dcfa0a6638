//! Error types for the bootstrap and launch phases.

use std::path::PathBuf;

/// Fatal error raised while preparing the configuration file.
///
/// Any of these aborts the run before the wrapped command starts. Nothing
/// already written is rolled back.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Parent directory could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Configuration file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Default path could not be linked to the override path.
    #[error("failed to link {} -> {}: {source}", link.display(), target.display())]
    Symlink {
        /// Path of the link being created.
        link: PathBuf,
        /// Path the link points to.
        target: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Path metadata could not be read.
    #[error("failed to inspect {}: {source}", path.display())]
    Probe {
        /// Path that was inspected.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Path exists but is a directory or other non-file entry.
    #[error("{} exists but is not a regular file", path.display())]
    NotAFile {
        /// Offending path.
        path: PathBuf,
    },

    /// Path is a symlink whose target does not exist.
    #[error("{} is a broken symbolic link", path.display())]
    BrokenLink {
        /// Offending path.
        path: PathBuf,
    },

    /// `API_PORT` is not a valid TCP port.
    #[error("invalid API_PORT {value:?}: {source}")]
    InvalidPort {
        /// Raw value from the environment.
        value: String,
        /// Parse failure.
        source: std::num::ParseIntError,
    },

    /// Servers document could not be rendered.
    #[error("failed to render servers file: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// Error raised when handing control to the wrapped command.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// Command could not be started.
    #[error("failed to exec {program}: {source}")]
    Exec {
        /// Program name as given.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Child process could not be awaited.
    #[error("failed to wait for {program}: {source}")]
    Wait {
        /// Program name as given.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
