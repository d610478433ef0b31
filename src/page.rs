//! Parameter structures for each kind of output page, and their conversion
//! into template [`Value`]s. A [`Page`] knows which template renders it; the
//! field names each page exposes to its template are fixed here.
//!
//! The template engine doesn't escape anything, so plain-text fields are
//! HTML-escaped on conversion. Only rendered content and the raw `<head>`
//! markup (`content`, `extrahead`, `customhead`) go in as-is.

use crate::post::{self, Post, Posts, Year};
use crate::settings::Settings;
use crate::template::{self, Renderer};
use crate::write::{self, Output};
use gtmpl::Value;
use pulldown_cmark_escape::escape_html;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Asset links on post pages climb out of `YYYY/MM/`.
const POST_ROOT: &str = "../../";

/// The archive lives at the output root.
const ARCHIVE_ROOT: &str = "./";

pub const FRONT_TEMPLATE: &str = "frontpage";
pub const POST_TEMPLATE: &str = "post";
pub const ARCHIVE_TEMPLATE: &str = "archive";
pub const GENERIC_TEMPLATE: &str = "page";

/// One output page of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Front(FrontPage),
    Post(PostPage),
    Archive(ArchivePage),
    Generic(GenericPage),
}

impl Page {
    /// The name of the template which renders this kind of page.
    pub fn template(&self) -> &'static str {
        match self {
            Page::Front(_) => FRONT_TEMPLATE,
            Page::Post(_) => POST_TEMPLATE,
            Page::Archive(_) => ARCHIVE_TEMPLATE,
            Page::Generic(_) => GENERIC_TEMPLATE,
        }
    }

    /// Renders the page with `renderer` and hands the bytes to `output`.
    /// Returns whether the file at `path` changed.
    pub fn publish<R: Renderer + ?Sized>(
        &self,
        renderer: &R,
        output: &mut Output,
        path: impl AsRef<Path>,
    ) -> Result<bool> {
        let bytes = renderer.render(self.template(), Value::from(self))?;
        Ok(output.write_if_changed(path, &bytes)?)
    }
}

impl From<&Page> for Value {
    fn from(page: &Page) -> Value {
        match page {
            Page::Front(p) => p.into(),
            Page::Post(p) => p.into(),
            Page::Archive(p) => p.into(),
            Page::Generic(p) => p.into(),
        }
    }
}

/// The front page: the most recent posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontPage {
    pub title: String,
    /// Raw markup for `<head>`.
    pub extra_head: String,
    pub posts: Vec<FrontPost>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontPost {
    pub title: String,
    pub summary: String,
    /// `YYYY/MM/DD`
    pub date: String,
    pub path: String,
}

impl FrontPage {
    /// Lists at most `limit` of the most recent `posts`.
    pub fn new(settings: &Settings, posts: &Posts, limit: usize) -> FrontPage {
        FrontPage {
            title: settings.title.clone(),
            extra_head: settings.index_extra_head.clone(),
            posts: posts
                .recent(limit)
                .iter()
                .map(|p| FrontPost {
                    title: p.subject.clone(),
                    summary: p.summary.clone(),
                    date: p.timestamp.format(post::SHORT_DATE_FORMAT).to_string(),
                    path: p.html_path(),
                })
                .collect(),
        }
    }
}

impl From<&FrontPage> for Value {
    fn from(page: &FrontPage) -> Value {
        object(vec![
            ("title", text(&page.title)),
            ("extrahead", (&page.extra_head).into()),
            (
                "posts",
                Value::Array(
                    page.posts
                        .iter()
                        .map(|p| {
                            object(vec![
                                ("title", text(&p.title)),
                                ("summary", text(&p.summary)),
                                ("date", text(&p.date)),
                                ("path", (&p.path).into()),
                            ])
                        })
                        .collect(),
                ),
            ),
        ])
    }
}

/// A single post's page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPage {
    pub root: String,
    pub title: String,
    /// `<site title>: <post subject>`
    pub page_title: String,
    pub extra_head: String,
    pub post_title: String,
    /// e.g. `January 02, 2006`
    pub date: String,
    pub content: String,
}

impl PostPage {
    pub fn new(settings: &Settings, post: &Post) -> PostPage {
        PostPage {
            root: POST_ROOT.to_owned(),
            title: settings.title.clone(),
            page_title: format!("{}: {}", settings.title, post.subject),
            extra_head: settings.index_extra_head.clone(),
            post_title: post.subject.clone(),
            date: post.timestamp.format(post::LONG_DATE_FORMAT).to_string(),
            content: post.html.clone(),
        }
    }
}

impl From<&PostPage> for Value {
    fn from(page: &PostPage) -> Value {
        object(vec![
            ("root", (&page.root).into()),
            ("title", text(&page.title)),
            ("pagetitle", text(&page.page_title)),
            ("extrahead", (&page.extra_head).into()),
            (
                "post",
                object(vec![
                    ("url", Value::from("")),
                    ("title", text(&page.post_title)),
                    ("date", text(&page.date)),
                    ("content", (&page.content).into()),
                ]),
            ),
        ])
    }
}

/// The archive: every post, grouped by year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePage {
    pub root: String,
    pub title: String,
    pub page_title: String,
    pub extra_head: String,
    pub years: Vec<Year>,
}

impl ArchivePage {
    pub fn new(settings: &Settings, posts: &Posts) -> ArchivePage {
        ArchivePage {
            root: ARCHIVE_ROOT.to_owned(),
            title: settings.title.clone(),
            page_title: format!("{}: archive", settings.title),
            extra_head: settings.index_extra_head.clone(),
            years: posts.group_by_year(),
        }
    }
}

impl From<&ArchivePage> for Value {
    fn from(page: &ArchivePage) -> Value {
        let years = page
            .years
            .iter()
            .map(|year| {
                object(vec![
                    ("year", Value::from(year.year)),
                    (
                        "posts",
                        Value::Array(
                            year.posts
                                .iter()
                                .map(|p| {
                                    object(vec![
                                        ("path", (&p.path).into()),
                                        ("title", text(&p.title)),
                                        ("date", text(&p.date)),
                                    ])
                                })
                                .collect(),
                        ),
                    ),
                ])
            })
            .collect();
        object(vec![
            ("root", (&page.root).into()),
            ("title", text(&page.title)),
            ("pagetitle", text(&page.page_title)),
            ("extrahead", (&page.extra_head).into()),
            ("years", Value::Array(years)),
        ])
    }
}

/// A standalone page in site mode. Everything but `root` and `content` comes
/// from the source file's headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericPage {
    pub title: String,
    /// Raw markup for `<head>`.
    pub custom_head: String,
    /// One `../` per directory between the page and the site root.
    pub root: String,
    /// Non-empty when this page is the site's front page.
    pub front_page: String,
    pub content: String,
    pub last_update: String,
}

impl From<&GenericPage> for Value {
    fn from(page: &GenericPage) -> Value {
        object(vec![
            ("title", text(&page.title)),
            ("customhead", (&page.custom_head).into()),
            ("root", (&page.root).into()),
            ("frontpage", text(&page.front_page)),
            ("content", (&page.content).into()),
            ("lastupdate", text(&page.last_update)),
        ])
    }
}

/// An HTML-escaped text value.
fn text(s: &str) -> Value {
    let mut escaped = String::with_capacity(s.len());
    // Writing to a `String` can't fail.
    let _ = escape_html(&mut escaped, s);
    Value::from(escaped)
}

fn object(fields: Vec<(&str, Value)>) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect::<HashMap<String, Value>>(),
    )
}

/// The result of a page-publishing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-publishing operation.
#[derive(Debug, Error)]
pub enum Error {
    /// An error during templating.
    #[error(transparent)]
    Template(#[from] template::Error),

    /// An error writing the output file.
    #[error(transparent)]
    Write(#[from] write::Error),
}
