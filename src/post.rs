//! Defines the [`Post`] and [`Posts`] types and the logic for loading posts
//! from the file system into memory. [`Posts`] is always sorted most recent
//! first, and every consumer (front page, archive, feed) relies on that order.

use crate::frontmatter::{self, Headers};
use crate::highlight::{self, Highlighter};
use crate::markdown;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

const MARKDOWN_EXTENSION: &str = "md";

/// Format of the `Timestamp` header.
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M";

/// Format of the `Date` header, and of dates on the front page.
pub const SHORT_DATE_FORMAT: &str = "%Y/%m/%d";

/// Format of the date shown on a post's own page.
pub const LONG_DATE_FORMAT: &str = "%B %d, %Y";

/// Format of the date shown next to a post in the archive.
pub const MONTH_DAY_FORMAT: &str = "%B %d";

/// A single blog entry. Posts are immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// The post title (`Subject` header).
    pub subject: String,

    /// A short description (`Summary` header); may be empty.
    pub summary: String,

    /// The source file's base name without its extension.
    pub filename: String,

    /// From the `Timestamp` header if present, else the `Date` header at
    /// midnight UTC.
    pub timestamp: DateTime<Utc>,

    /// The rendered and normalized body.
    pub html: String,
}

impl Post {
    /// Builds a post from a parsed document's headers and its rendered body.
    pub fn from_headers(filename: &str, headers: &Headers, html: String) -> Result<Post> {
        Ok(Post {
            subject: headers.get("Subject").cloned().unwrap_or_default(),
            summary: headers.get("Summary").cloned().unwrap_or_default(),
            filename: filename.to_owned(),
            timestamp: timestamp(headers)?,
            html,
        })
    }

    /// The output path relative to the output root, `YYYY/MM/<filename>.html`.
    /// This is also the post's permanent identity, so it depends on nothing
    /// but `timestamp` and `filename`.
    pub fn html_path(&self) -> String {
        format!("{}/{}.html", self.timestamp.format("%Y/%m"), self.filename)
    }

    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }
}

fn timestamp(headers: &Headers) -> Result<DateTime<Utc>> {
    let naive = match headers.get("Timestamp").filter(|ts| !ts.is_empty()) {
        Some(ts) => NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).map_err(|e| {
            Error::MissingTimestamp {
                reason: format!("bad `Timestamp` {:?}: {}", ts, e),
            }
        })?,
        None => match headers.get("Date") {
            None => {
                return Err(Error::MissingTimestamp {
                    reason: "no `Date` or `Timestamp` header".to_owned(),
                })
            }
            Some(date) => NaiveDate::parse_from_str(date, SHORT_DATE_FORMAT)
                .map_err(|e| Error::MissingTimestamp {
                    reason: format!("bad `Date` {:?}: {}", date, e),
                })?
                .and_time(NaiveTime::MIN),
        },
    };
    Ok(Utc.from_utc_datetime(&naive))
}

/// Sorts posts by timestamp, most recent first. The sort is stable, so posts
/// sharing a timestamp keep their relative order.
pub fn sort_descending(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// A list of posts that is sorted most recent first by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Posts(Vec<Post>);

impl Posts {
    /// Takes ownership of `posts` and sorts them with [`sort_descending`].
    pub fn new(mut posts: Vec<Post>) -> Posts {
        sort_descending(&mut posts);
        Posts(posts)
    }

    pub fn as_slice(&self) -> &[Post] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Post> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `n` most recent posts (fewer if there aren't that many).
    pub fn recent(&self, n: usize) -> &[Post] {
        &self.0[..n.min(self.0.len())]
    }

    /// Groups posts into contiguous runs sharing a calendar year in a single
    /// left-to-right pass. Because [`Posts`] is sorted descending, the groups
    /// come out with strictly decreasing years and their concatenation is the
    /// whole list in order.
    pub fn group_by_year(&self) -> Vec<Year> {
        let mut years: Vec<Year> = Vec::new();
        for post in self.iter() {
            let summary = ArchiveEntry::from(post);
            match years.last_mut() {
                Some(open) if open.year == post.year() => open.posts.push(summary),
                _ => years.push(Year {
                    year: post.year(),
                    posts: vec![summary],
                }),
            }
        }
        years
    }

    fn check_unique_paths(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for post in self.iter() {
            let path = post.html_path();
            if !seen.insert(path.clone()) {
                return Err(Error::DuplicateOutputPath { path });
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Posts {
    type Item = &'a Post;
    type IntoIter = std::slice::Iter<'a, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One calendar year of the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Year {
    pub year: i32,
    pub posts: Vec<ArchiveEntry>,
}

/// What the archive shows for a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub title: String,
    /// e.g. `January 02`
    pub date: String,
}

impl From<&Post> for ArchiveEntry {
    fn from(post: &Post) -> ArchiveEntry {
        ArchiveEntry {
            path: post.html_path(),
            title: post.subject.clone(),
            date: post.timestamp.format(MONTH_DAY_FORMAT).to_string(),
        }
    }
}

/// Recursively searches `source_directory` for `.md` files and loads each as
/// a [`Post`]. Each file must be structured as follows:
///
/// 1. A `---` line
/// 2. Headers: `Subject`, optionally `Summary`, and `Date` (`YYYY/MM/DD`) or
///    `Timestamp` (`YYYY/MM/DD HH:MM`)
/// 3. A `---` line
/// 4. The markdown body
///
/// Loading stops at the first bad post. Two posts resolving to the same
/// output path is an error.
pub fn load_posts(source_directory: &Path, highlighter: &Highlighter) -> Result<Posts> {
    let mut posts = Vec::new();
    for result in WalkDir::new(source_directory).sort_by_file_name() {
        let entry = result?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().map_or(false, |ext| ext == MARKDOWN_EXTENSION)
        {
            log::debug!("loading post {}", path.display());
            posts.push(load_post(path, highlighter)?);
        }
    }

    let posts = Posts::new(posts);
    posts.check_unique_paths()?;
    Ok(posts)
}

/// Loads a single post file, annotating any error with its path.
pub fn load_post(path: &Path, highlighter: &Highlighter) -> Result<Post> {
    fn load(path: &Path, highlighter: &Highlighter) -> Result<Post> {
        let filename = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| Error::InvalidFileName(path.to_owned()))?;
        let contents = std::fs::read_to_string(path)?;
        let document = frontmatter::split(&contents)?;
        let html = markdown::to_html(document.body, highlighter)?;
        Post::from_headers(filename, &document.headers, html)
    }

    load(path, highlighter)
        .map_err(|e| Error::Annotated(format!("parsing post `{}`", path.display()), Box::new(e)))
}

/// Represents the result of a post-loading operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading [`Post`]s.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when a post has neither a usable `Timestamp` nor `Date`.
    #[error("missing timestamp: {reason}")]
    MissingTimestamp { reason: String },

    /// Returned when two posts would be written to the same file.
    #[error("two posts resolve to the same output path `{path}`")]
    DuplicateOutputPath { path: String },

    /// Returned when a post's front matter can't be parsed.
    #[error(transparent)]
    FrontMatter(#[from] frontmatter::Error),

    /// Returned when a code block in the post can't be highlighted.
    #[error(transparent)]
    Highlight(#[from] highlight::Error),

    /// Returned when a source file name isn't valid UTF-8.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),

    /// Returned for I/O errors reading a post.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned for errors walking the posts directory.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// An error with an annotation.
    #[error("{0}: {1}")]
    Annotated(String, Box<Error>),
}
