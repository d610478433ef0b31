//! Syntax highlighting for fenced code blocks. A [`Highlighter`] is built once
//! per run and handed to [`crate::markdown::to_html`]; it is never mutated
//! after construction.

use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use thiserror::Error;

/// The theme used when none is configured.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// The number of spaces a tab expands to when none is configured.
pub const DEFAULT_TAB_WIDTH: usize = 2;

/// Renders source code as a `<pre>` fragment with inline styles.
#[derive(Debug)]
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
    tab: String,
}

impl Highlighter {
    /// Loads the bundled syntax definitions and the named theme. Fails with
    /// [`Error::UnknownTheme`] if `theme` isn't one of the bundled themes.
    pub fn new(theme: &str, tab_width: usize) -> Result<Highlighter> {
        let mut themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .remove(theme)
            .ok_or_else(|| Error::UnknownTheme {
                name: theme.to_owned(),
            })?;
        Ok(Highlighter {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            tab: " ".repeat(tab_width),
        })
    }

    /// Highlights `source` with the lexer registered for `language`, which
    /// may be a syntax name (`Rust`, case-insensitive) or a file extension
    /// (`rs`).
    pub fn highlight(&self, source: &str, language: &str) -> Result<String> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(language)
            .ok_or_else(|| Error::UnknownLanguage {
                tag: language.to_owned(),
            })?;
        let source = source.replace('\t', &self.tab);
        highlighted_html_for_string(&source, &self.syntax_set, syntax, &self.theme)
            .map_err(Error::Syntect)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Highlighter {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme: ThemeSet::load_defaults()
                .themes
                .remove(DEFAULT_THEME)
                .unwrap_or_default(),
            tab: " ".repeat(DEFAULT_TAB_WIDTH),
        }
    }
}

/// The result of a fallible highlighting operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem highlighting a code block.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when a code block's language tag has no registered lexer.
    #[error("unknown syntax highlight language {tag:?}")]
    UnknownLanguage { tag: String },

    /// Returned when the configured theme isn't bundled.
    #[error("unknown highlight theme {name:?}")]
    UnknownTheme { name: String },

    /// Returned when tokenizing the code fails.
    #[error("highlighting code: {0}")]
    Syntect(syntect::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_highlight_by_name_and_extension() -> Result<()> {
        let highlighter = Highlighter::default();
        for tag in ["rust", "Rust", "rs"] {
            let html = highlighter.highlight("fn main() {}\n", tag)?;
            assert!(html.starts_with("<pre style="), "{}", html);
            assert!(html.contains("main"));
            assert!(!html.contains("class="));
        }
        Ok(())
    }

    #[test]
    fn test_highlight_unknown_language() {
        let err = Highlighter::default()
            .highlight("x", "no-such-language")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownLanguage { ref tag } if tag == "no-such-language"
        ));
    }

    #[test]
    fn test_tabs_expand_to_configured_width() -> Result<()> {
        let highlighter = Highlighter::new(DEFAULT_THEME, 4)?;
        let html = highlighter.highlight("\tx\n", "txt")?;
        assert!(!html.contains('\t'));
        assert!(html.contains("    x"), "{}", html);
        Ok(())
    }

    #[test]
    fn test_unknown_theme() {
        assert!(matches!(
            Highlighter::new("no-such-theme", 2),
            Err(Error::UnknownTheme { .. })
        ));
    }
}
