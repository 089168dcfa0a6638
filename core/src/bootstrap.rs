//! The bootstrap step: make sure a servers file is reachable at the default path.

use std::path::{Path, PathBuf};

use crate::config::BootstrapEnv;
use crate::error::BootstrapError;
use crate::fs::{Filesystem, PathKind};
use crate::servers::ServersFile;

/// What the bootstrap step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A file already sat at the default path.
    InPlace {
        /// The default path.
        path: PathBuf,
    },
    /// An existing override file was linked to the default path.
    Linked {
        /// The override file.
        target: PathBuf,
        /// The default path, now a symlink.
        link: PathBuf,
    },
    /// A new file was written from the environment.
    Synthesized {
        /// Where the file was written.
        path: PathBuf,
        /// The default path, if it was linked to `path`.
        link: Option<PathBuf>,
    },
    /// No file and no host: nothing was done.
    Missing {
        /// The path that was looked up.
        path: PathBuf,
    },
}

/// Ensure a servers file is available at `default_path`.
///
/// Resolves the effective path from `env`, then either reuses an existing
/// file (linking it to `default_path` when they differ), synthesizes one from
/// the API settings, or logs a warning and leaves the filesystem alone.
///
/// # Errors
///
/// Fails on the first filesystem error, when an override path is not a
/// regular file, or when the configured port is invalid. Earlier mutations are
/// not rolled back.
pub fn bootstrap(
    env: &BootstrapEnv,
    fs: &impl Filesystem,
    default_path: &Path,
) -> Result<Outcome, BootstrapError> {
    let path = env.effective_path(default_path);
    let relocated = path != default_path;
    tracing::debug!(path = %path.display(), relocated, "Resolved config path");

    if relocated {
        ensure_parent(fs, path)?;
    }

    let kind = fs.probe(path).map_err(|source| BootstrapError::Probe {
        path: path.to_path_buf(),
        source,
    })?;

    match kind {
        PathKind::File if relocated => {
            link(fs, path, default_path)?;
            Ok(Outcome::Linked {
                target: path.to_path_buf(),
                link: default_path.to_path_buf(),
            })
        },
        PathKind::File => Ok(Outcome::InPlace {
            path: path.to_path_buf(),
        }),
        PathKind::Missing => synthesize(env, fs, path, default_path),
        // A non-file at the default path counts as no file.
        PathKind::BrokenLink | PathKind::Directory | PathKind::Other if !relocated => {
            tracing::debug!(path = %path.display(), ?kind, "Default path is not a usable file");
            synthesize(env, fs, path, default_path)
        },
        PathKind::BrokenLink => Err(BootstrapError::BrokenLink {
            path: path.to_path_buf(),
        }),
        PathKind::Directory | PathKind::Other => Err(BootstrapError::NotAFile {
            path: path.to_path_buf(),
        }),
    }
}

/// Write a new servers file at `path` from the API settings, if a host is set.
fn synthesize(
    env: &BootstrapEnv,
    fs: &impl Filesystem,
    path: &Path,
    default_path: &Path,
) -> Result<Outcome, BootstrapError> {
    let Some(entry) = env.api.synthesize()? else {
        tracing::warn!(
            "{} not found and API_HOST is not set; any existing {} will be used as-is",
            path.display(),
            default_path.display()
        );
        return Ok(Outcome::Missing {
            path: path.to_path_buf(),
        });
    };

    let contents = ServersFile::with_main(entry).to_yaml()?;

    ensure_parent(fs, path)?;
    fs.write(path, &contents)
        .map_err(|source| BootstrapError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), "Wrote servers file");

    let link_path = if path == default_path {
        None
    } else {
        link(fs, path, default_path)?;
        Some(default_path.to_path_buf())
    };

    Ok(Outcome::Synthesized {
        path: path.to_path_buf(),
        link: link_path,
    })
}

/// Point `link_path` at `target`, creating the link's directory if needed.
fn link(fs: &impl Filesystem, target: &Path, link_path: &Path) -> Result<(), BootstrapError> {
    ensure_parent(fs, link_path)?;
    fs.symlink_force(target, link_path)
        .map_err(|source| BootstrapError::Symlink {
            link: link_path.to_path_buf(),
            target: target.to_path_buf(),
            source,
        })?;
    tracing::debug!(link = %link_path.display(), target = %target.display(), "Linked config");
    Ok(())
}

/// Create the parent directory of `path`, if it has one.
fn ensure_parent(fs: &impl Filesystem, path: &Path) -> Result<(), BootstrapError> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    fs.create_dir_all(parent)
        .map_err(|source| BootstrapError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })
}
