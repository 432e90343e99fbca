use std::time::Duration;

use color_eyre::eyre::Context;
use quick_xml::{
    Reader,
    events::{BytesEnd, BytesStart, Event},
};
use reqwest::{Client, ClientBuilder, header};
use tracing::instrument;

use super::FeedSource;
use crate::{
    errors::{Result, UserFacingError},
    model::FeedEntry,
};

/// The timeout for the feed requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client retrieving Atom release feeds, like the ones published by GitHub at `/<owner>/<repo>/releases.atom`
#[derive(Clone)]
pub struct AtomFeedClient {
    inner: Client,
}

impl AtomFeedClient {
    /// Builds a new feed client
    pub fn new() -> Result<Self> {
        let inner = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(5))
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .wrap_err("Couldn't build the feed http client")?;
        Ok(Self { inner })
    }
}

impl FeedSource for AtomFeedClient {
    #[instrument(skip(self))]
    async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>> {
        tracing::debug!("Fetching feed");

        let res = self
            .inner
            .get(url)
            .header(header::ACCEPT, "application/atom+xml")
            .send()
            .await
            .map_err(|err| {
                tracing::error!("{err:?}");
                UserFacingError::FeedRequestFailed(err.to_string())
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::error!("Got response [{}]:\n{body}", status.as_str());
            return Err(UserFacingError::FeedStatus(status.as_u16()).into());
        }

        let body = res.text().await.map_err(|err| {
            tracing::error!("{err:?}");
            UserFacingError::FeedRequestFailed(err.to_string())
        })?;

        let entries = parse_atom_feed(&body)?;
        tracing::debug!("Parsed {} entries", entries.len());
        Ok(entries)
    }
}

/// Fields of an entry whose text is collected
#[derive(Clone, Copy, PartialEq, Eq)]
enum EntryField {
    Id,
    Updated,
    Title,
    Content,
}

impl EntryField {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"id" => Some(EntryField::Id),
            b"updated" => Some(EntryField::Updated),
            b"title" => Some(EntryField::Title),
            b"content" => Some(EntryField::Content),
            _ => None,
        }
    }
}

/// Atom XML state machine collecting the entries of a feed
#[derive(Default)]
struct AtomParser {
    entries: Vec<FeedEntry>,
    entry: Option<FeedEntry>,
    field: Option<EntryField>,
    is_feed: bool,
}

impl AtomParser {
    fn handle_start(&mut self, e: &BytesStart<'_>) {
        let name = e.local_name();
        let in_entry = self.entry.is_some();
        match (in_entry, name.as_ref()) {
            (false, b"feed") => self.is_feed = true,
            (false, b"entry") => self.entry = Some(FeedEntry::default()),
            // Nested elements within a field (like xhtml content) don't change the collected field
            (true, name) if self.field.is_none() => self.field = EntryField::from_name(name),
            _ => {}
        }
    }

    fn handle_text(&mut self, text: &str) {
        if let (Some(entry), Some(field)) = (&mut self.entry, self.field) {
            let target = match field {
                EntryField::Id => &mut entry.id,
                EntryField::Updated => &mut entry.updated,
                EntryField::Title => &mut entry.title,
                EntryField::Content => &mut entry.content,
            };
            target.push_str(text);
        }
    }

    fn handle_end(&mut self, e: &BytesEnd<'_>) {
        let name = e.local_name();
        if name.as_ref() == b"entry" {
            if let Some(mut entry) = self.entry.take() {
                entry.id = entry.id.trim().to_owned();
                entry.updated = entry.updated.trim().to_owned();
                entry.title = entry.title.trim().to_owned();
                entry.content = entry.content.trim().to_owned();
                self.entries.push(entry);
            }
            self.field = None;
        } else if self.field.is_some() && self.field == EntryField::from_name(name.as_ref()) {
            self.field = None;
        }
    }
}

/// Parses an Atom XML feed into its raw entries.
///
/// A well-formed feed without entries is not an error.
pub fn parse_atom_feed(xml: &str) -> Result<Vec<FeedEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut parser = AtomParser::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => parser.handle_start(e),
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| UserFacingError::FeedMalformed(err.to_string()))?;
                parser.handle_text(&text);
            }
            Ok(Event::CData(ref e)) => parser.handle_text(&String::from_utf8_lossy(e)),
            Ok(Event::End(ref e)) => parser.handle_end(e),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(UserFacingError::FeedMalformed(format!(
                    "error at position {}: {err}",
                    reader.error_position()
                ))
                .into());
            }
        }
    }

    if !parser.is_feed {
        return Err(UserFacingError::FeedMalformed(String::from("the document is not an Atom feed")).into());
    }

    Ok(parser.entries)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:media="http://search.yahoo.com/mrss/" xml:lang="en-US">
  <id>tag:github.com,2008:https://github.com/firefly-iii/firefly-iii/releases</id>
  <link type="text/html" rel="alternate" href="https://github.com/firefly-iii/firefly-iii/releases"/>
  <title>Release notes from firefly-iii</title>
  <updated>2024-03-01T05:12:44Z</updated>
  <entry>
    <id>tag:github.com,2008:Repository/1/v6.1.10</id>
    <updated>2024-03-01T05:12:44Z</updated>
    <link rel="alternate" type="text/html" href="https://github.com/firefly-iii/firefly-iii/releases/tag/v6.1.10"/>
    <title>v6.1.10</title>
    <content type="html">&lt;h3&gt;Fixed&lt;/h3&gt;
&lt;ul&gt;&lt;li&gt;A bug &amp;amp; more&lt;/li&gt;&lt;/ul&gt;</content>
    <author>
      <name>JC5</name>
    </author>
  </entry>
  <entry>
    <id>tag:github.com,2008:Repository/1/v6.1.10-beta.1</id>
    <updated>2024-02-20T08:00:00Z</updated>
    <title>v6.1.10-beta.1</title>
    <content type="html"><![CDATA[<h2>Beta</h2>]]></content>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_atom_feed() {
        let entries = parse_atom_feed(FEED).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0],
            FeedEntry {
                id: String::from("tag:github.com,2008:Repository/1/v6.1.10"),
                updated: String::from("2024-03-01T05:12:44Z"),
                title: String::from("v6.1.10"),
                content: String::from("<h3>Fixed</h3>\n<ul><li>A bug &amp; more</li></ul>"),
            }
        );
        assert_eq!(entries[1].title, "v6.1.10-beta.1");
        assert_eq!(entries[1].content, "<h2>Beta</h2>");
    }

    #[test]
    fn test_parse_feed_without_entries() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>Empty</title></feed>"#;
        assert!(parse_atom_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed_feed() {
        let err = parse_atom_feed("<feed><entry><title>v1</entry></feed>").unwrap_err();
        assert!(matches!(err.user_facing(), Some(UserFacingError::FeedMalformed(_))), "{err:?}");
    }

    #[test]
    fn test_parse_not_a_feed() {
        let err = parse_atom_feed("<html><body>Not found</body></html>").unwrap_err();
        assert!(matches!(err.user_facing(), Some(UserFacingError::FeedMalformed(_))), "{err:?}");
    }
}
