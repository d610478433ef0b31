//! Converts markdown bodies to HTML. Fenced code blocks that name a language
//! are intercepted and replaced by the [`Highlighter`]'s output; everything
//! else goes through [`pulldown_cmark::html::push_html`] untouched. The result
//! is then run through [`normalize`].

use crate::highlight::{Error as HighlightError, Highlighter};
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Parser, Tag, TagEnd};

/// Textual rewrites applied, in order, to the whole rendered buffer. They make
/// the output byte-compatible with pages rendered by the previous generator.
/// This set is closed; don't add markdown features here.
const LEGACY_REWRITES: [(&str, &str); 9] = [
    (" --- ", " &mdash; "),
    (" -- ", " &mdash; "),
    (" --\n", " &mdash;\n"),
    ("\n--", "\n&mdash;"),
    ("&quot;", "\""),
    (">\n\n", ">\n"),
    ("<hr>", "<hr />"),
    ("<li><p>", "<li>\n<p>"),
    ("</p></li>", "</p>\n</li>"),
];

/// Converts `markdown` to normalized HTML. No markdown extensions are enabled.
/// Fails with [`HighlightError::UnknownLanguage`] when a fenced block's
/// language has no lexer.
pub fn to_html(markdown: &str, highlighter: &Highlighter) -> Result<String, HighlightError> {
    let events = highlight_code_blocks(Parser::new(markdown), highlighter)?;
    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    Ok(normalize(&out))
}

/// Applies [`LEGACY_REWRITES`] globally, one rule at a time, then trims
/// leading and trailing spaces and newlines.
pub fn normalize(html: &str) -> String {
    let rewritten = LEGACY_REWRITES
        .iter()
        .fold(html.to_owned(), |acc, (from, to)| acc.replace(from, to));
    rewritten.trim_matches(|c| c == ' ' || c == '\n').to_owned()
}

struct FencedCode {
    language: String,
    source: String,
}

fn highlight_code_blocks<'a>(
    parser: Parser<'a>,
    highlighter: &Highlighter,
) -> Result<Vec<Event<'a>>, HighlightError> {
    let mut events = Vec::new();
    let mut fenced: Option<FencedCode> = None;
    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) if has_language(&info) => {
                fenced = Some(FencedCode {
                    language: language(&info).to_owned(),
                    source: String::new(),
                });
            }
            Event::Text(text) if fenced.is_some() => {
                if let Some(code) = fenced.as_mut() {
                    code.source.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) if fenced.is_some() => {
                if let Some(code) = fenced.take() {
                    let html = highlighter.highlight(&code.source, &code.language)?;
                    events.push(Event::Html(CowStr::from(html)));
                }
            }
            event => events.push(event),
        }
    }
    Ok(events)
}

// The language is the first word of the info string (e.g. `rust` in
// "```rust ignore").
fn language<'a>(info: &'a CowStr) -> &'a str {
    info.split_whitespace().next().unwrap_or("")
}

fn has_language(info: &CowStr) -> bool {
    !language(info).is_empty()
}
