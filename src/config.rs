//! Run configuration: where sources, templates and outputs live, and the few
//! knobs that can be tuned from an optional `cms.yaml` in the root directory.

use crate::highlight::{DEFAULT_TAB_WIDTH, DEFAULT_THEME};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The name of the optional project file.
pub const PROJECT_FILE: &str = "cms.yaml";

#[derive(Deserialize)]
struct FrontPageSize(usize);
impl Default for FrontPageSize {
    fn default() -> Self {
        FrontPageSize(10)
    }
}

#[derive(Deserialize)]
struct FeedSize(usize);
impl Default for FeedSize {
    fn default() -> Self {
        FeedSize(3)
    }
}

#[derive(Deserialize)]
struct Theme(String);
impl Default for Theme {
    fn default() -> Self {
        Theme(DEFAULT_THEME.to_owned())
    }
}

#[derive(Deserialize)]
struct TabWidth(usize);
impl Default for TabWidth {
    fn default() -> Self {
        TabWidth(DEFAULT_TAB_WIDTH)
    }
}

#[derive(Deserialize)]
struct ExcludedDirectories(Vec<String>);
impl Default for ExcludedDirectories {
    fn default() -> Self {
        ExcludedDirectories(vec![".git".to_owned(), "_darcs".to_owned(), "blog".to_owned()])
    }
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct Project {
    #[serde(default)]
    front_page_size: FrontPageSize,

    #[serde(default)]
    feed_size: FeedSize,

    #[serde(default)]
    highlight_theme: Theme,

    #[serde(default)]
    tab_width: TabWidth,

    #[serde(default)]
    excluded_directories: ExcludedDirectories,
}

/// Everything a build needs to know besides the sources themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The header-only settings file (`src/settings`).
    pub settings_file: PathBuf,

    /// Searched recursively for post sources (`src/posts`).
    pub posts_directory: PathBuf,

    /// Holds `page.gotmpl` and the per-page blog templates (`src/templates`).
    pub templates_directory: PathBuf,

    /// Blog output root; posts land in `YYYY/MM/` beneath it.
    pub output_directory: PathBuf,

    /// The template for every page in site mode (`site/page.gotmpl`).
    pub site_template: PathBuf,

    /// Walked recursively in site mode; pages are written next to their
    /// sources.
    pub site_directory: PathBuf,

    /// Directory names skipped anywhere in the site-mode walk.
    pub excluded_directories: Vec<String>,

    /// The number of posts on the front page.
    pub front_page_size: usize,

    /// The number of posts in the feed.
    pub feed_size: usize,

    /// The bundled syntax-highlighting theme for code blocks.
    pub highlight_theme: String,

    /// Spaces per tab in highlighted code.
    pub tab_width: usize,
}

impl Config {
    /// The configuration for a tree rooted at `root` using the conventional
    /// layout and default knobs.
    pub fn with_root(root: &Path) -> Config {
        Config::from_project(root, Project::default())
    }

    /// Like [`Config::with_root`], but applies `root/cms.yaml` if it exists.
    pub fn from_directory(root: &Path) -> Result<Config> {
        let path = root.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path)
        } else {
            Ok(Config::with_root(root))
        }
    }

    /// Loads the project file at `path`; its directory is the root.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let project: Project = if text.trim().is_empty() {
            Project::default()
        } else {
            serde_yaml::from_str(&text)
                .with_context(|| format!("Loading configuration `{}`", path.display()))?
        };
        Ok(Config::from_project(root, project))
    }

    fn from_project(root: &Path, project: Project) -> Config {
        let src = root.join("src");
        Config {
            settings_file: src.join("settings"),
            posts_directory: src.join("posts"),
            templates_directory: src.join("templates"),
            output_directory: root.to_owned(),
            site_template: root.join("site").join("page.gotmpl"),
            site_directory: root.to_owned(),
            excluded_directories: project.excluded_directories.0,
            front_page_size: project.front_page_size.0,
            feed_size: project.feed_size.0,
            highlight_theme: project.highlight_theme.0,
            tab_width: project.tab_width.0,
        }
    }
}
