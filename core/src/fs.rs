//! Filesystem access used by the bootstrapper.
//!
//! The bootstrap step only talks to the [`Filesystem`] trait, so callers can
//! observe or intercept mutations without touching the real disk layout.

use std::io;
use std::path::Path;

/// What currently sits at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Nothing exists at the path.
    Missing,
    /// A regular file, or a symlink resolving to one.
    File,
    /// A directory, or a symlink resolving to one.
    Directory,
    /// A symlink whose target does not exist.
    BrokenLink,
    /// A socket, fifo or device.
    Other,
}

/// Filesystem operations the bootstrapper needs.
pub trait Filesystem {
    /// Classify what exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if metadata cannot be read for a reason other than
    /// the path not existing.
    fn probe(&self, path: &Path) -> io::Result<PathKind>;

    /// Create `path` and all missing parents. Succeeds if it already exists.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Write `contents` to `path`, replacing whatever file or link is there.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Make `link` a symlink to `target`, replacing whatever is at `link`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn symlink_force(&self, target: &Path, link: &Path) -> io::Result<()>;
}

/// [`Filesystem`] backed by the host's real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFs;

impl Filesystem for HostFs {
    fn probe(&self, path: &Path) -> io::Result<PathKind> {
        let link_meta = match std::fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(PathKind::Missing),
            Err(e) => return Err(e),
        };

        let meta = if link_meta.file_type().is_symlink() {
            match std::fs::metadata(path) {
                Ok(meta) => meta,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Ok(PathKind::BrokenLink);
                },
                Err(e) => return Err(e),
            }
        } else {
            link_meta
        };

        Ok(if meta.is_file() {
            PathKind::File
        } else if meta.is_dir() {
            PathKind::Directory
        } else {
            PathKind::Other
        })
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let staging = staging_path(path);
        std::fs::write(&staging, contents)?;

        // Renaming replaces a dangling link at `path` instead of following it.
        if let Err(e) = std::fs::rename(&staging, path) {
            let _ = std::fs::remove_file(&staging);
            return Err(e);
        }

        Ok(())
    }

    #[cfg(unix)]
    fn symlink_force(&self, target: &Path, link: &Path) -> io::Result<()> {
        let staging = staging_path(link);

        // Leftover from an interrupted run.
        match std::fs::remove_file(&staging) {
            Ok(()) => {},
            Err(e) if e.kind() == io::ErrorKind::NotFound => {},
            Err(e) => return Err(e),
        }

        std::os::unix::fs::symlink(target, &staging)?;
        if let Err(e) = std::fs::rename(&staging, link) {
            let _ = std::fs::remove_file(&staging);
            return Err(e);
        }

        Ok(())
    }

    #[cfg(windows)]
    fn symlink_force(&self, target: &Path, link: &Path) -> io::Result<()> {
        match std::fs::remove_file(link) {
            Ok(()) => {},
            Err(e) if e.kind() == io::ErrorKind::NotFound => {},
            Err(e) => return Err(e),
        }

        std::os::windows::fs::symlink_file(target, link)
    }
}

/// Sibling path used to stage a file or symlink before renaming it into place.
fn staging_path(path: &Path) -> std::path::PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "config".into(), |n| n.to_string_lossy());

    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_probe_kinds() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("servers.yml");
        std::fs::write(&file, "x").unwrap();
        let good_link = dir.path().join("good");
        std::os::unix::fs::symlink(&file, &good_link).unwrap();
        let bad_link = dir.path().join("bad");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), &bad_link).unwrap();

        let fs = HostFs;
        assert_eq!(fs.probe(&file).unwrap(), PathKind::File);
        assert_eq!(fs.probe(&good_link).unwrap(), PathKind::File);
        assert_eq!(fs.probe(&bad_link).unwrap(), PathKind::BrokenLink);
        assert_eq!(fs.probe(dir.path()).unwrap(), PathKind::Directory);
        assert_eq!(
            fs.probe(&dir.path().join("absent")).unwrap(),
            PathKind::Missing
        );
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_symlink_force_replaces_file_and_link() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.yml");
        let second = dir.path().join("second.yml");
        let link = dir.path().join("servers.yml");
        std::fs::write(&first, "first").unwrap();
        std::fs::write(&second, "second").unwrap();
        std::fs::write(&link, "plain file").unwrap();

        let fs = HostFs;
        fs.symlink_force(&first, &link).unwrap();
        assert_eq!(std::fs::read_link(&link).unwrap(), first);

        fs.symlink_force(&second, &link).unwrap();
        assert_eq!(std::fs::read_link(&link).unwrap(), second);
        assert_eq!(std::fs::read_to_string(&link).unwrap(), "second");

        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_write_replaces_dangling_link() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("servers.yml");
        let gone = dir.path().join("volume").join("servers.yml");
        std::os::unix::fs::symlink(&gone, &path).unwrap();

        HostFs.write(&path, "servers: {}\n").unwrap();

        assert!(!std::fs::symlink_metadata(&path).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "servers: {}\n");
        assert!(!gone.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_symlink_force_onto_directory_fails() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("servers.yml");
        std::fs::write(&target, "x").unwrap();
        let occupied = dir.path().join("occupied");
        std::fs::create_dir(&occupied).unwrap();
        std::fs::write(occupied.join("keep"), "x").unwrap();

        assert!(HostFs.symlink_force(&target, &occupied).is_err());
        assert!(occupied.join("keep").exists());
    }
}
