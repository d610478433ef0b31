//! The template-rendering collaborator. Pages hand a template name and a
//! [`Value`] to a [`Renderer`] and get bytes back. [`TemplateSet`] is the
//! [`gtmpl`] (Go template) implementation used by the builds.

use gtmpl::{Context, Template, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The file extension of template files.
pub const TEMPLATE_EXTENSION: &str = "gotmpl";

/// Renders a named template with a parameter value.
pub trait Renderer {
    fn render(&self, name: &str, params: Value) -> Result<Vec<u8>>;
}

/// A set of parsed Go templates keyed by name.
#[derive(Default)]
pub struct TemplateSet {
    templates: HashMap<String, Template>,
}

impl TemplateSet {
    /// Parses each named source into a template.
    pub fn from_sources<'a>(sources: impl IntoIterator<Item = (&'a str, String)>) -> Result<TemplateSet> {
        let mut set = TemplateSet::default();
        for (name, source) in sources {
            set.insert(name, &source)?;
        }
        Ok(set)
    }

    /// Loads `<name>.gotmpl` from `directory` for every name on top of the
    /// shared `<layout>.gotmpl`. The layout is what gets executed; each page
    /// file is parsed as a separate tree, so only its `{{define}}` blocks
    /// matter, and they replace any the layout defines.
    pub fn load_with_layout(directory: &Path, layout: &str, names: &[&str]) -> Result<TemplateSet> {
        let layout = read_template(&template_path(directory, layout))?;
        let mut set = TemplateSet::default();
        for name in names {
            let page = read_template(&template_path(directory, name))?;
            let parse_error = |err| Error::Parse {
                name: (*name).to_owned(),
                err,
            };
            let mut template = Template::default();
            template.parse(layout.as_str()).map_err(parse_error)?;
            template.add_template(*name, page).map_err(parse_error)?;
            set.templates.insert((*name).to_owned(), template);
        }
        Ok(set)
    }

    /// Loads a single template file under `name`.
    pub fn load_file(name: &str, path: &Path) -> Result<TemplateSet> {
        let contents = read_template(path)?;
        TemplateSet::from_sources([(name, contents)])
    }

    fn insert(&mut self, name: &str, source: &str) -> Result<()> {
        let mut template = Template::default();
        template.parse(source).map_err(|err| Error::Parse {
            name: name.to_owned(),
            err,
        })?;
        self.templates.insert(name.to_owned(), template);
        Ok(())
    }
}

impl Renderer for TemplateSet {
    fn render(&self, name: &str, params: Value) -> Result<Vec<u8>> {
        let render_error = |err: String| Error::Render {
            name: name.to_owned(),
            err,
        };
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;
        let context = Context::from(params).map_err(render_error)?;
        let mut out = Vec::new();
        template.execute(&mut out, &context).map_err(render_error)?;
        Ok(out)
    }
}

fn template_path(directory: &Path, name: &str) -> PathBuf {
    directory.join(name).with_extension(TEMPLATE_EXTENSION)
}

fn read_template(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| Error::Open {
        path: path.to_owned(),
        err,
    })
}

/// The result of a fallible templating operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading or executing templates.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned for I/O problems while opening template files.
    #[error("opening template file `{}`: {err}", .path.display())]
    Open {
        path: PathBuf,
        err: std::io::Error,
    },

    /// Returned for errors parsing template files.
    #[error("parsing template `{name}`: {err}")]
    Parse { name: String, err: String },

    /// Returned when executing a template fails.
    #[error("rendering template `{name}`: {err}")]
    Render { name: String, err: String },

    /// Returned when no template is registered under the requested name.
    #[error("no template named `{0}`")]
    NotFound(String),
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn object(pairs: &[(&str, Value)]) -> Value {
        Value::Object(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_render_fields_and_ranges() -> Result<()> {
        let set = TemplateSet::from_sources([(
            "list",
            "{{.title}}:{{range .items}} {{.}}{{end}}".to_owned(),
        )])?;
        let params = object(&[
            ("title", Value::from("Things")),
            (
                "items",
                Value::Array(vec![Value::from("a"), Value::from("b")]),
            ),
        ]);
        assert_eq!(set.render("list", params)?, b"Things: a b".to_vec());
        Ok(())
    }

    #[test]
    fn test_render_unknown_name() {
        let set = TemplateSet::default();
        assert!(matches!(
            set.render("missing", Value::Nil),
            Err(Error::NotFound(ref name)) if name == "missing"
        ));
    }

    #[test]
    fn test_parse_error_names_template() {
        let err = TemplateSet::from_sources([("broken", "{{.title".to_owned())])
            .err()
            .unwrap();
        assert!(matches!(err, Error::Parse { ref name, .. } if name == "broken"));
    }

    #[test]
    fn test_load_with_layout_executes_layout_with_page_blocks() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("page.gotmpl"),
            "<html>{{template \"body\" .}}</html>",
        )
        .unwrap();
        // Text outside the define, like the trailing newline, isn't output.
        fs::write(
            dir.path().join("archive.gotmpl"),
            "{{define \"body\"}}<p>{{.title}}</p>{{end}}\n",
        )
        .unwrap();

        let set = TemplateSet::load_with_layout(dir.path(), "page", &["archive"])?;
        let out = set.render("archive", object(&[("title", Value::from("T"))]))?;
        assert_eq!(String::from_utf8(out).unwrap(), "<html><p>T</p></html>");
        Ok(())
    }

    #[test]
    fn test_page_blocks_replace_layout_blocks() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("page.gotmpl"),
            "{{define \"head\"}}default{{end}}[{{template \"head\" .}}]",
        )
        .unwrap();
        fs::write(dir.path().join("post.gotmpl"), "{{define \"head\"}}custom{{end}}").unwrap();
        fs::write(dir.path().join("archive.gotmpl"), "\n").unwrap();

        let set = TemplateSet::load_with_layout(dir.path(), "page", &["post", "archive"])?;
        assert_eq!(set.render("post", Value::Nil)?, b"[custom]".to_vec());
        assert_eq!(set.render("archive", Value::Nil)?, b"[default]".to_vec());
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            TemplateSet::load_with_layout(dir.path(), "page", &["post"]),
            Err(Error::Open { .. })
        ));
    }
}
