//! The library code for the `cms` static blog and site builder. A run is one
//! of two pipelines:
//!
//! 1. Blog mode ([`build::build_blog`]): parse posts from markdown sources
//!    with header front matter ([`crate::post`]), then render a page per post,
//!    a front page, an archive, and an Atom feed ([`crate::page`],
//!    [`crate::feed`]).
//! 2. Site mode ([`build::build_site`]): render every markdown file under a
//!    directory tree as a standalone page next to its source
//!    ([`crate::site`]).
//!
//! Both pipelines hand their rendered bytes to an [`write::Output`], which
//! only touches a file when its contents would change. Running a build twice
//! against the same sources therefore writes nothing the second time.
//!
//! Markdown rendering lives in [`crate::markdown`]: fenced code blocks with a
//! language tag are syntax-highlighted ([`crate::highlight`]) and the final
//! HTML is passed through a fixed set of textual rewrites.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod feed;
pub mod frontmatter;
pub mod highlight;
pub mod markdown;
pub mod page;
pub mod post;
pub mod settings;
pub mod site;
pub mod template;
pub mod write;
