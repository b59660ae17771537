// src/ingest/providers/rss.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::time::Duration;

use crate::ingest::types::{Entry, FeedSource};
use crate::ingest::{clean_field, parse_feed_timestamp, scrub_html_entities_for_xml};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    /// RSS 2.0, and RSS 1.0 (`rdf:RDF`) which uses the same item fields.
    Rss,
    Atom,
}

impl Format {
    fn from_root(name: &[u8]) -> Option<Self> {
        match name {
            b"rss" | b"rdf:RDF" => Some(Self::Rss),
            b"feed" => Some(Self::Atom),
            _ => None,
        }
    }

    fn item_tag(self) -> &'static [u8] {
        match self {
            Self::Rss => b"item",
            Self::Atom => b"entry",
        }
    }
}

/// Raw child values of one `<item>` / `<entry>`. First occurrence wins.
#[derive(Debug, Default)]
struct Draft {
    id: Option<String>,
    title: Option<String>,
    link: Option<String>,
    alternate: Option<String>,
    published: Option<String>,
    updated: Option<String>,
}

impl Draft {
    /// Names are matched with their prefix, so `media:title` or `atom:link`
    /// never shadow the plain elements.
    fn set(&mut self, format: Format, name: &[u8], value: String) {
        let slot = match (format, name) {
            (Format::Rss, b"guid") | (Format::Atom, b"id") => &mut self.id,
            (_, b"title") => &mut self.title,
            (Format::Rss, b"link") => &mut self.link,
            (Format::Rss, b"pubDate") | (Format::Atom, b"published") => &mut self.published,
            (Format::Rss, b"dc:date") | (Format::Atom, b"updated") => &mut self.updated,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    /// Atom `<link>`: the first `rel="alternate"` (or rel-less) href wins,
    /// any other href is only a fallback.
    fn atom_link(&mut self, e: &BytesStart<'_>) {
        let mut href = None;
        let mut rel = None;
        for attr in e.attributes().flatten() {
            let value = String::from_utf8_lossy(&attr.value).into_owned();
            match attr.key.as_ref() {
                b"href" => href = Some(value),
                b"rel" => rel = Some(value),
                _ => {}
            }
        }
        let Some(href) = href else { return };
        if matches!(rel.as_deref(), None | Some("alternate")) {
            self.alternate.get_or_insert(href);
        } else {
            self.link.get_or_insert(href);
        }
    }

    fn finish(self, format: Format) -> Entry {
        let link = match format {
            Format::Rss => self.link,
            Format::Atom => self.alternate.or(self.link),
        };
        Entry {
            id: clean_field(self.id),
            title: clean_field(self.title),
            link: clean_field(link),
            published_at: self
                .published
                .as_deref()
                .and_then(parse_feed_timestamp)
                .or_else(|| self.updated.as_deref().and_then(parse_feed_timestamp)),
        }
    }
}

/// Parse an RSS or Atom document into entries, in document order.
///
/// Only direct children of `<item>` / `<entry>` are read; extension
/// elements and nested markup are ignored wherever they appear.
pub fn parse_feed(xml: &str) -> Result<Vec<Entry>> {
    let t0 = std::time::Instant::now();
    let xml_clean = scrub_html_entities_for_xml(xml);
    let mut reader = Reader::from_str(&xml_clean);
    reader.config_mut().trim_text(true);

    let mut format: Option<Format> = None;
    let mut depth = 0usize;
    let mut item_depth: Option<usize> = None;
    let mut draft = Draft::default();
    let mut field: Option<Vec<u8>> = None;
    let mut text = String::new();
    let mut entries = Vec::new();

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("parsing feed xml near byte {}", reader.buffer_position()))?;
        match event {
            Event::Start(e) => {
                depth += 1;
                let name = e.name();
                let name = name.as_ref();
                let fmt = match format {
                    Some(f) => f,
                    None => {
                        let Some(f) = Format::from_root(name) else {
                            bail!(
                                "not an rss or atom document (root <{}>)",
                                String::from_utf8_lossy(name)
                            );
                        };
                        format = Some(f);
                        f
                    }
                };
                match item_depth {
                    None if name == fmt.item_tag() => {
                        item_depth = Some(depth);
                        draft = Draft::default();
                    }
                    Some(d) if depth == d + 1 => {
                        if fmt == Format::Atom && name == b"link" {
                            draft.atom_link(&e);
                        }
                        field = Some(name.to_vec());
                        text.clear();
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                // Self-closing children sit one level below the item, without a depth bump.
                if format == Some(Format::Atom)
                    && item_depth == Some(depth)
                    && e.name().as_ref() == b"link"
                {
                    draft.atom_link(&e);
                }
            }
            Event::Text(t) => {
                if field.is_some() && item_depth.map(|d| d + 1) == Some(depth) {
                    text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::CData(c) => {
                if field.is_some() && item_depth.map(|d| d + 1) == Some(depth) {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => {
                if let (Some(fmt), Some(d)) = (format, item_depth) {
                    if depth == d + 1 {
                        if let Some(name) = field.take() {
                            if name.as_slice() == e.name().as_ref() {
                                draft.set(fmt, &name, std::mem::take(&mut text));
                            }
                        }
                    } else if depth == d {
                        entries.push(std::mem::take(&mut draft).finish(fmt));
                        item_depth = None;
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if format.is_none() {
        bail!("feed document has no root element");
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("feed_parse_ms").record(ms);
    counter!("feed_entries_total").increment(entries.len() as u64);
    Ok(entries)
}

pub struct RssFeedSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RssFeedSource {
    pub fn from_fixture(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(url: impl Into<String>, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(20))
            .build()
            .context("building feed http client")?;
        Ok(Self {
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        })
    }
}

#[async_trait]
impl FeedSource for RssFeedSource {
    async fn fetch_entries(&self) -> Result<Vec<Entry>> {
        match &self.mode {
            Mode::Fixture(s) => parse_feed(s),
            Mode::Http { url, client } => {
                let resp = client.get(url).send().await.context("feed http get()")?;
                let status = resp.status();
                if !status.is_success() {
                    bail!("feed http status {status}");
                }
                let body = resp.text().await.context("feed http .text()")?;
                parse_feed(&body)
            }
        }
    }

    fn name(&self) -> &str {
        match &self.mode {
            Mode::Fixture(_) => "fixture",
            Mode::Http { url, .. } => url,
        }
    }
}
