//! Exports [`build_blog`] and [`build_site`], which stitch together the
//! high-level steps of each run mode. Both are strictly sequential and stop at
//! the first error; files written by earlier steps are left in place (they
//! are complete and correct, just not the whole set).

use crate::config::Config;
use crate::feed::{self, Error as FeedError};
use crate::highlight::{Error as HighlightError, Highlighter};
use crate::page::{self, ArchivePage, Error as PageError, FrontPage, Page, PostPage};
use crate::post::{self, Error as ParseError, Posts};
use crate::settings::{self, Settings};
use crate::site::{self, Error as SiteError};
use crate::template::{Error as TemplateError, Renderer, TemplateSet};
use crate::write::Output;
use std::path::PathBuf;
use thiserror::Error;

/// The shared layout template every blog page builds on.
pub const LAYOUT_TEMPLATE: &str = "page";

/// The per-page templates loaded from the templates directory.
pub const BLOG_TEMPLATES: [&str; 3] = [
    page::FRONT_TEMPLATE,
    page::POST_TEMPLATE,
    page::ARCHIVE_TEMPLATE,
];

/// Everything a blog build reads, loaded once up front and read-only after.
pub struct Blog {
    pub settings: Settings,
    pub posts: Posts,
    pub templates: TemplateSet,
}

impl Blog {
    /// Loads settings, templates, and posts.
    pub fn load(config: &Config, highlighter: &Highlighter) -> Result<Blog> {
        let settings = Settings::load(&config.settings_file)?;
        let templates =
            TemplateSet::load_with_layout(&config.templates_directory, LAYOUT_TEMPLATE, &BLOG_TEMPLATES)?;
        let posts = post::load_posts(&config.posts_directory, highlighter)?;
        log::info!("loaded {} posts", posts.len());
        Ok(Blog {
            settings,
            posts,
            templates,
        })
    }
}

/// Builds the blog: every post page, then the front page, the archive, and
/// the feed. Returns the paths that were written.
pub fn build_blog(config: &Config, output: &mut Output) -> Result<Vec<PathBuf>> {
    let highlighter = Highlighter::new(&config.highlight_theme, config.tab_width)?;
    let blog = Blog::load(config, &highlighter)?;
    let before = output.written().len();

    render_posts(&blog.settings, &blog.posts, &blog.templates, output)?;
    render_front(&blog.settings, &blog.posts, config.front_page_size, &blog.templates, output)?;
    render_archive(&blog.settings, &blog.posts, &blog.templates, output)?;
    log::info!("writing feed");
    feed::write_feed(&blog.settings, &blog.posts, config.feed_size, output)?;

    Ok(output.written()[before..].to_vec())
}

/// Renders one page per post at its `YYYY/MM/<filename>.html` path.
pub fn render_posts<R: Renderer + ?Sized>(
    settings: &Settings,
    posts: &Posts,
    renderer: &R,
    output: &mut Output,
) -> Result<()> {
    log::info!("rendering {} post pages", posts.len());
    for post in posts {
        Page::Post(PostPage::new(settings, post)).publish(renderer, output, post.html_path())?;
    }
    Ok(())
}

/// Renders `index.html` with the `limit` most recent posts.
pub fn render_front<R: Renderer + ?Sized>(
    settings: &Settings,
    posts: &Posts,
    limit: usize,
    renderer: &R,
    output: &mut Output,
) -> Result<()> {
    log::info!("rendering front page");
    Page::Front(FrontPage::new(settings, posts, limit)).publish(renderer, output, "index.html")?;
    Ok(())
}

/// Renders `archive.html`, every post grouped by year.
pub fn render_archive<R: Renderer + ?Sized>(
    settings: &Settings,
    posts: &Posts,
    renderer: &R,
    output: &mut Output,
) -> Result<()> {
    log::info!("rendering archive");
    Page::Archive(ArchivePage::new(settings, posts)).publish(renderer, output, "archive.html")?;
    Ok(())
}

/// Builds the site: renders every markdown file under the site directory,
/// except in excluded directories, with the site template. Returns the paths
/// that were written.
pub fn build_site(config: &Config, output: &mut Output) -> Result<Vec<PathBuf>> {
    let highlighter = Highlighter::new(&config.highlight_theme, config.tab_width)?;
    let template = TemplateSet::load_file(page::GENERIC_TEMPLATE, &config.site_template)?;
    let before = output.written().len();

    site::render_pages(
        &config.site_directory,
        &config.excluded_directories,
        &highlighter,
        &template,
        output,
    )?;

    Ok(output.written()[before..].to_vec())
}

/// The result of a build.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for a build. Each variant wraps the failing step's error.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when the settings file can't be read or parsed.
    #[error(transparent)]
    Settings(#[from] settings::Error),

    /// Returned for errors loading posts.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Returned when the highlighter can't be configured.
    #[error(transparent)]
    Highlight(#[from] HighlightError),

    /// Returned for errors loading template files.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Returned for errors rendering or writing a page.
    #[error(transparent)]
    Page(#[from] PageError),

    /// Returned for errors building or writing the feed.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// Returned for errors in site mode.
    #[error(transparent)]
    Site(#[from] SiteError),
}
