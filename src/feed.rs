//! Support for creating the Atom feed from the most recent posts.

use crate::post::{Post, Posts};
use crate::settings::Settings;
use crate::write::{self, Output};
use atom_syndication::{Content, Entry, Error as AtomError, Feed, Link, Person};
use thiserror::Error;

/// Where the feed is written, relative to the output root. The feed's
/// self-link is the site link with this appended.
pub const FEED_PATH: &str = "atom.xml";

/// Builds a feed of the `limit` most recent `posts`. The feed's `updated` time
/// is the newest post's timestamp, so an empty post list is an error.
pub fn feed(settings: &Settings, posts: &Posts, limit: usize) -> Result<Feed> {
    let newest = posts.iter().next().ok_or(Error::Empty)?;

    let mut feed = Feed::default();
    feed.set_title(settings.title.as_str());
    feed.set_id(settings.id_base.as_str());
    feed.set_links(vec![
        link(settings.link.clone(), None),
        link(format!("{}{}", settings.link, FEED_PATH), Some("self")),
    ]);
    feed.set_updated(newest.timestamp);
    let mut author = Person::default();
    author.set_name(settings.author.as_str());
    author.set_email(Some(settings.email.clone()));
    feed.set_authors(vec![author]);
    feed.set_entries(
        posts
            .recent(limit)
            .iter()
            .map(|post| entry(settings, post))
            .collect::<Vec<Entry>>(),
    );
    Ok(feed)
}

fn entry(settings: &Settings, post: &Post) -> Entry {
    let mut content = Content::default();
    content.set_content_type(Some("html".to_owned()));
    content.set_value(Some(post.html.clone()));

    let mut entry = Entry::default();
    entry.set_id(entry_id(settings, post));
    entry.set_updated(post.timestamp);
    entry.set_title(post.subject.as_str());
    entry.set_links(vec![link(
        format!("{}{}", settings.link, post.html_path()),
        None,
    )]);
    entry.set_content(Some(content));
    entry
}

/// `<id_base>/<YYYY-MM-DD>/<filename>`
pub fn entry_id(settings: &Settings, post: &Post) -> String {
    format!(
        "{}/{}/{}",
        settings.id_base,
        post.timestamp.format("%Y-%m-%d"),
        post.filename
    )
}

// A link without a relation keeps the Atom default, `alternate`.
fn link(href: String, rel: Option<&str>) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    if let Some(rel) = rel {
        link.set_rel(rel);
    }
    link
}

/// Serializes `feed` as XML.
pub fn to_xml(feed: &Feed) -> Result<Vec<u8>> {
    feed.write_to(Vec::new()).map_err(Error::Atom)
}

/// Builds the feed and writes it to [`FEED_PATH`] through `output`. Returns
/// whether the file changed.
pub fn write_feed(settings: &Settings, posts: &Posts, limit: usize, output: &mut Output) -> Result<bool> {
    let xml = to_xml(&feed(settings, posts, limit)?)?;
    Ok(output.write_if_changed(FEED_PATH, &xml)?)
}

/// The result of a fallible feed operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating the feed.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when there are no posts to take the feed's updated time from.
    #[error("cannot build a feed without posts")]
    Empty,

    /// Returned when the feed can't be serialized.
    #[error("serializing feed: {0}")]
    Atom(AtomError),

    /// Returned when the feed file can't be written.
    #[error(transparent)]
    Write(#[from] write::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn settings() -> Settings {
        Settings {
            title: "Notes".to_owned(),
            link: "http://example.org/blog/".to_owned(),
            id_base: "tag:example.org,2009:blog".to_owned(),
            author: "A. Writer".to_owned(),
            email: "writer@example.org".to_owned(),
            index_extra_head: String::new(),
        }
    }

    fn posts(n: u32) -> Posts {
        Posts::new(
            (1..=n)
                .map(|i| Post {
                    subject: format!("Post {}", i),
                    summary: String::new(),
                    filename: format!("post-{}", i),
                    timestamp: Utc.with_ymd_and_hms(2010, i, 1 + i, 8, 30, 0).unwrap(),
                    html: format!("<p>Body {} & more</p>", i),
                })
                .collect(),
        )
    }

    #[test]
    fn test_feed_takes_three_most_recent() -> Result<()> {
        let feed = feed(&settings(), &posts(5), 3)?;
        let ids: Vec<&str> = feed.entries().iter().map(|e| e.id()).collect();
        assert_eq!(
            ids,
            vec![
                "tag:example.org,2009:blog/2010-05-06/post-5",
                "tag:example.org,2009:blog/2010-04-05/post-4",
                "tag:example.org,2009:blog/2010-03-04/post-3",
            ]
        );
        assert_eq!(feed.updated().to_rfc3339(), "2010-05-06T08:30:00+00:00");
        Ok(())
    }

    #[test]
    fn test_feed_with_fewer_posts_than_limit() -> Result<()> {
        assert_eq!(feed(&settings(), &posts(2), 3)?.entries().len(), 2);
        Ok(())
    }

    #[test]
    fn test_empty_feed() {
        assert!(matches!(
            feed(&settings(), &Posts::default(), 3),
            Err(Error::Empty)
        ));
    }

    #[test]
    fn test_feed_links_and_author() -> Result<()> {
        let feed = feed(&settings(), &posts(1), 3)?;
        let links: Vec<(&str, &str)> = feed.links().iter().map(|l| (l.href(), l.rel())).collect();
        assert_eq!(
            links,
            vec![
                ("http://example.org/blog/", "alternate"),
                ("http://example.org/blog/atom.xml", "self"),
            ]
        );
        assert_eq!(feed.authors()[0].name(), "A. Writer");
        assert_eq!(feed.authors()[0].email(), Some("writer@example.org"));

        let entry = &feed.entries()[0];
        assert_eq!(entry.links()[0].href(), "http://example.org/blog/2010/01/post-1.html");
        let content = entry.content().unwrap();
        assert_eq!(content.content_type(), Some("html"));
        assert_eq!(content.value(), Some("<p>Body 1 & more</p>"));
        Ok(())
    }

    #[test]
    fn test_to_xml_shape() -> Result<()> {
        let xml = String::from_utf8(to_xml(&feed(&settings(), &posts(1), 3)?)?).unwrap();
        assert!(xml.contains("<feed xmlns=\"http://www.w3.org/2005/Atom\""), "{}", xml);
        assert!(xml.contains("<id>tag:example.org,2009:blog</id>"));
        assert!(xml.contains("<email>writer@example.org</email>"));
        assert!(xml.contains("<content type=\"html\">&lt;p&gt;Body 1 &amp; more&lt;/p&gt;</content>"));
        assert!(xml.contains("rel=\"self\""));
        assert_eq!(xml.matches("<entry>").count(), 1);
        Ok(())
    }
}
