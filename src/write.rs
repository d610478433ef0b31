//! The idempotent writer. Output files are only touched when their bytes
//! would change, so re-running a build against unchanged sources writes
//! nothing.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Writes rendered files beneath a root directory and remembers which ones it
/// actually changed.
#[derive(Debug)]
pub struct Output {
    /// Paths passed to [`Output::write_if_changed`] are relative to this.
    root: PathBuf,

    /// Whether to print ` * <path>` to stdout for each write.
    announce: bool,

    /// Relative paths written so far, in write order.
    written: Vec<PathBuf>,
}

impl Output {
    /// Creates an output rooted at `root` which announces every write on
    /// stdout.
    pub fn new(root: impl Into<PathBuf>) -> Output {
        Output {
            root: root.into(),
            announce: true,
            written: Vec::new(),
        }
    }

    /// Creates an output which records writes without printing them.
    pub fn quiet(root: impl Into<PathBuf>) -> Output {
        Output {
            announce: false,
            ..Output::new(root)
        }
    }

    /// The relative paths written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Compares `contents` with the file at `path` (relative to the root) and
    /// writes it, creating parent directories, only if they differ. A missing
    /// file counts as different. Returns whether a write happened.
    pub fn write_if_changed(&mut self, path: impl AsRef<Path>, contents: &[u8]) -> Result<bool> {
        let relative = path.as_ref();
        let target = self.root.join(relative);

        let annotate = |err| Error {
            path: target.clone(),
            err,
        };
        match std::fs::read(&target) {
            Ok(existing) if existing == contents => {
                log::debug!("unchanged: {}", target.display());
                return Ok(false);
            }
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(annotate(err)),
        }

        if let Some(dir) = target.parent() {
            std::fs::create_dir_all(dir).map_err(annotate)?;
        }
        std::fs::write(&target, contents).map_err(annotate)?;

        if self.announce {
            println!(" * {}", relative.display());
        }
        self.written.push(relative.to_owned());
        Ok(true)
    }
}

/// The result of a fallible write.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure reading or writing an output file.
#[derive(Debug, Error)]
#[error("writing `{}`: {err}", .path.display())]
pub struct Error {
    pub path: PathBuf,
    pub err: io::Error,
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_write_creates_directories() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Output::quiet(dir.path());
        assert!(out.write_if_changed("2020/01/post.html", b"hello")?);
        assert_eq!(fs::read(dir.path().join("2020/01/post.html")).unwrap(), b"hello");
        assert_eq!(out.written(), &[PathBuf::from("2020/01/post.html")]);
        Ok(())
    }

    #[test]
    fn test_write_skips_identical_contents() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), b"same").unwrap();
        let mut out = Output::quiet(dir.path());
        assert!(!out.write_if_changed("index.html", b"same")?);
        assert!(out.written().is_empty());
        Ok(())
    }

    #[test]
    fn test_write_replaces_different_contents() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), b"old").unwrap();
        let mut out = Output::quiet(dir.path());
        assert!(out.write_if_changed("index.html", b"new")?);
        assert!(!out.write_if_changed("index.html", b"new")?);
        assert_eq!(fs::read(dir.path().join("index.html")).unwrap(), b"new");
        assert_eq!(out.written().len(), 1);
        Ok(())
    }

    #[test]
    fn test_write_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should go can be neither read nor
        // replaced.
        fs::create_dir_all(dir.path().join("archive.html")).unwrap();
        let mut out = Output::quiet(dir.path());
        let err = out.write_if_changed("archive.html", b"x").unwrap_err();
        assert_eq!(err.path, dir.path().join("archive.html"));

        // The cause is part of the message and appears once in the chain.
        let message = format!("{:#}", anyhow::Error::from(err));
        assert!(message.starts_with("writing `"), "{}", message);
        assert_eq!(message.matches("os error").count(), 1, "{}", message);
    }
}
