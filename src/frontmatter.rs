//! Splits source documents into a header block and a body, and parses header
//! blocks into a key/value mapping. The same header parser is used for the
//! header-only settings file.
//!
//! A document looks like this (the segment before the first delimiter is
//! ignored and is normally empty):
//!
//! ```text
//! ---
//! Subject: Hello, world!
//! Date: 2021/04/16
//! ---
//! # Hello
//!
//! World
//! ```

use std::collections::HashMap;
use thiserror::Error;

/// The literal line separating the leading segment, the headers, and the body.
pub const DELIMITER: &str = "---\n";

/// Separates a header name from its value.
const SEPARATOR: &str = ": ";

/// Header name to value. Keys are unique; order is irrelevant.
pub type Headers = HashMap<String, String>;

/// A parsed source document. Documents are transient: they are consumed to
/// build a [`crate::post::Post`] or a generic page and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<'a> {
    pub headers: Headers,
    pub body: &'a str,
}

/// Splits `input` on [`DELIMITER`] and parses the header segment. The
/// delimiter must appear at least twice; everything after the second one is
/// the body, delimiters included.
pub fn split(input: &str) -> Result<Document<'_>> {
    let mut parts = input.splitn(3, DELIMITER);
    let _leading = parts.next();
    match (parts.next(), parts.next()) {
        (Some(headers), Some(body)) => Ok(Document {
            headers: parse_headers(headers)?,
            body,
        }),
        _ => Err(Error::MissingDelimiter),
    }
}

/// Parses `Name: value` lines into [`Headers`]. Blank lines are skipped; the
/// first non-blank line without the `": "` separator fails the whole block.
/// When a name repeats, the last value wins.
pub fn parse_headers(text: &str) -> Result<Headers> {
    let mut headers = Headers::new();
    for line in text.split('\n') {
        if line.is_empty() {
            continue;
        }
        match line.split_once(SEPARATOR) {
            Some((name, value)) => {
                headers.insert(name.to_owned(), value.to_owned());
            }
            None => {
                return Err(Error::MalformedHeader {
                    line: line.to_owned(),
                })
            }
        }
    }
    Ok(headers)
}

/// The inverse of [`parse_headers`]: one `Name: value` line per header, sorted
/// by name so the output is deterministic.
pub fn serialize_headers(headers: &Headers) -> String {
    let mut names: Vec<&String> = headers.keys().collect();
    names.sort();
    let mut out = String::new();
    for name in names {
        out.push_str(name);
        out.push_str(SEPARATOR);
        out.push_str(&headers[name]);
        out.push('\n');
    }
    out
}

/// The result of a fallible front-matter operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem parsing front matter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Returned when a header line lacks the `Name: value` separator.
    #[error("bad header line {line:?}")]
    MalformedHeader { line: String },

    /// Returned when a document has fewer than two `---` delimiter lines.
    #[error("document must contain a `---` line before and after its headers")]
    MissingDelimiter,
}
