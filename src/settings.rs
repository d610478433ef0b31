//! Site-wide settings read from the header-only `settings` file.

use crate::frontmatter::{self, Headers};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Keys that every blog is expected to set.
const REQUIRED: [&str; 5] = ["title", "link", "id_base", "author", "email"];

/// Values from the settings file. Missing keys read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// The site title.
    pub title: String,

    /// The canonical base URL, with a trailing slash.
    pub link: String,

    /// The prefix for feed entry ids.
    pub id_base: String,

    /// The feed author's name.
    pub author: String,

    /// The feed author's email.
    pub email: String,

    /// Raw HTML added to every blog page's `<head>`; optional.
    pub index_extra_head: String,
}

impl Settings {
    pub fn from_headers(headers: &Headers) -> Settings {
        for key in REQUIRED.iter().filter(|k| !headers.contains_key(**k)) {
            log::warn!("settings: `{}` is not set", key);
        }
        let get = |key: &str| headers.get(key).cloned().unwrap_or_default();
        Settings {
            title: get("title"),
            link: get("link"),
            id_base: get("id_base"),
            author: get("author"),
            email: get("email"),
            index_extra_head: get("index_extra_head"),
        }
    }

    /// Reads and parses the settings file at `path`.
    pub fn load(path: &Path) -> Result<Settings> {
        let text = std::fs::read_to_string(path).map_err(|err| Error::Io {
            path: path.to_owned(),
            err,
        })?;
        let headers = frontmatter::parse_headers(&text).map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })?;
        Ok(Settings::from_headers(&headers))
    }
}

/// The result of loading settings.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the settings file.
#[derive(Debug, Error)]
pub enum Error {
    #[error("reading settings `{}`: {err}", .path.display())]
    Io {
        path: PathBuf,
        err: std::io::Error,
    },

    #[error("parsing settings `{}`: {err}", .path.display())]
    Parse {
        path: PathBuf,
        err: frontmatter::Error,
    },
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings");
        std::fs::write(
            &path,
            "title: Notes\nlink: http://example.org/\nid_base: tag:example.org,2009\n\
             author: A. Writer\nemail: a@example.org\n",
        )
        .unwrap();
        let settings = Settings::load(&path)?;
        assert_eq!(
            settings,
            Settings {
                title: "Notes".to_owned(),
                link: "http://example.org/".to_owned(),
                id_base: "tag:example.org,2009".to_owned(),
                author: "A. Writer".to_owned(),
                email: "a@example.org".to_owned(),
                index_extra_head: String::new(),
            }
        );
        Ok(())
    }

    #[test]
    fn test_load_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings");
        std::fs::write(&path, "title Notes\n").unwrap();
        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        let message = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(message.matches("title Notes").count(), 1, "{}", message);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Settings::load(&dir.path().join("settings")),
            Err(Error::Io { .. })
        ));
    }
}
