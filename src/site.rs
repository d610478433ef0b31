//! Site mode: every markdown file under the site root becomes a standalone
//! HTML page next to its source, rendered with a single template.

use crate::frontmatter::{self, Headers};
use crate::highlight::{self, Highlighter};
use crate::markdown;
use crate::page::{self, GenericPage, Page};
use crate::template::Renderer;
use crate::write::Output;
use chrono::{DateTime, Local};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

const MARKDOWN_EXTENSION: &str = "md";
const HTML_EXTENSION: &str = "html";

/// Finds every `.md` file under `root`, skipping directories named in
/// `excluded` at any depth. Paths are returned relative to `root`, in file
/// name order.
pub fn find_pages(root: &Path, excluded: &[String]) -> Result<Vec<PathBuf>> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let skip = entry.depth() > 0
                && entry.file_type().is_dir()
                && excluded.iter().any(|name| entry.file_name() == name.as_str());
            if skip {
                log::debug!("skipping {}", entry.path().display());
            }
            !skip
        });

    let mut pages = Vec::new();
    for result in walker {
        let entry = result?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().map_or(false, |ext| ext == MARKDOWN_EXTENSION)
        {
            // strip_prefix() shouldn't fail since `root` is an ancestor of
            // every entry.
            if let Ok(relative) = path.strip_prefix(root) {
                pages.push(relative.to_owned());
            }
        }
    }
    Ok(pages)
}

/// The prefix that leads from a page back to the site root: one `../` per
/// directory the page is nested in.
pub fn root_prefix(relative: &Path) -> String {
    let depth = relative
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count()
        .saturating_sub(1);
    "../".repeat(depth)
}

/// The output path for a page source: the same path with an `.html`
/// extension.
pub fn html_path(relative: &Path) -> PathBuf {
    relative.with_extension(HTML_EXTENSION)
}

impl GenericPage {
    /// Builds a page from a source's headers and rendered body. `modified` is
    /// used for `lastupdate` when the headers don't set it.
    pub fn from_headers(relative: &Path, headers: &Headers, content: String, modified: Option<DateTime<Local>>) -> GenericPage {
        let get = |key: &str| headers.get(key).cloned().unwrap_or_default();
        GenericPage {
            title: get("title"),
            custom_head: get("customhead"),
            root: root_prefix(relative),
            front_page: get("frontpage"),
            content,
            last_update: headers.get("lastupdate").cloned().unwrap_or_else(|| {
                modified
                    .map(|m| m.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            }),
        }
    }

    /// Reads and renders the source at `root/relative`.
    pub fn load(root: &Path, relative: &Path, highlighter: &Highlighter) -> Result<GenericPage> {
        let path = root.join(relative);
        let annotate = |err: Error| Error::Annotated(format!("rendering page `{}`", path.display()), Box::new(err));

        let contents = std::fs::read_to_string(&path).map_err(|e| annotate(e.into()))?;
        let modified = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Local>::from);
        let document = frontmatter::split(&contents).map_err(|e| annotate(e.into()))?;
        let content = markdown::to_html(document.body, highlighter).map_err(|e| annotate(e.into()))?;
        Ok(GenericPage::from_headers(relative, &document.headers, content, modified))
    }
}

/// Renders every page under `root` with the template named `page` and
/// writes the results through `output`, whose root should be `root` too.
pub fn render_pages<R: Renderer + ?Sized>(
    root: &Path,
    excluded: &[String],
    highlighter: &Highlighter,
    renderer: &R,
    output: &mut Output,
) -> Result<()> {
    for relative in find_pages(root, excluded)? {
        log::debug!("rendering {}", relative.display());
        let page = Page::Generic(GenericPage::load(root, &relative, highlighter)?);
        page.publish(renderer, output, html_path(&relative))?;
    }
    Ok(())
}

/// The result of a site-mode operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error rendering the site.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    FrontMatter(#[from] frontmatter::Error),

    #[error(transparent)]
    Highlight(#[from] highlight::Error),

    #[error(transparent)]
    Page(#[from] page::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// An error with an annotation.
    #[error("{0}: {1}")]
    Annotated(String, Box<Error>),
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_root_prefix() {
        assert_eq!(root_prefix(Path::new("index.md")), "");
        assert_eq!(root_prefix(Path::new("code/index.md")), "../");
        assert_eq!(root_prefix(Path::new("a/b/c.md")), "../../");
    }

    #[test]
    fn test_html_path() {
        assert_eq!(html_path(Path::new("a/b/c.md")), PathBuf::from("a/b/c.html"));
    }

    #[test]
    fn test_find_pages_skips_excluded_directories() -> Result<()> {
        let dir = tempfile::tempdir()?;
        for path in ["index.md", "code/tool.md", "code/notes.txt", ".git/x.md", "blog/post.md", "deep/blog/y.md"] {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap())?;
            fs::write(path, "")?;
        }
        let excluded: Vec<String> = vec![".git".into(), "_darcs".into(), "blog".into()];
        assert_eq!(
            find_pages(dir.path(), &excluded)?,
            vec![PathBuf::from("code/tool.md"), PathBuf::from("index.md")]
        );
        Ok(())
    }

    #[test]
    fn test_generic_page_from_headers() -> Result<()> {
        let headers: Headers = [
            ("title", "Home"),
            ("customhead", "<style></style>"),
            ("frontpage", "yes"),
            ("lastupdate", "2012-01-01"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let page = GenericPage::from_headers(Path::new("x/index.md"), &headers, "<p>hi</p>".into(), None);
        assert_eq!(
            page,
            GenericPage {
                title: "Home".into(),
                custom_head: "<style></style>".into(),
                root: "../".into(),
                front_page: "yes".into(),
                content: "<p>hi</p>".into(),
                last_update: "2012-01-01".into(),
            }
        );
        Ok(())
    }

    #[test]
    fn test_last_update_falls_back_to_modification_time() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("about.md"), "---\ntitle: About\n---\nMe.\n")?;
        let page = GenericPage::load(dir.path(), Path::new("about.md"), &Highlighter::default())?;
        assert_eq!(page.last_update, Local::now().format("%Y-%m-%d").to_string());
        assert_eq!(page.front_page, "");
        assert_eq!(page.content, "<p>Me.</p>");
        Ok(())
    }

    #[test]
    fn test_load_annotates_errors_with_path() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("bad.md"), "---\ntitle About\n---\nMe.\n")?;
        let err = GenericPage::load(dir.path(), Path::new("bad.md"), &Highlighter::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("bad.md"), "{}", message);
        assert!(message.contains("title About"), "{}", message);
        Ok(())
    }
}
