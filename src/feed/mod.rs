//! Atom feed output
//!
//! Renders the collected program records as an Atom document and writes it
//! to the configured path. Entry order is discovery order; when
//! `max-items` is set the feed is truncated to the first N discovered
//! programs (the truncation policy, not an implicit buffer bound).

use crate::config::FeedConfig;
use crate::program::Program;
use crate::{GuideError, Result};
use chrono::{DateTime, FixedOffset};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::path::Path;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

fn feed_err<E: std::fmt::Display>(e: E) -> GuideError {
    GuideError::Feed(e.to_string())
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(feed_err)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(feed_err)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(feed_err)?;
    Ok(())
}

fn link_element(writer: &mut Writer<Vec<u8>>, href: &str) -> Result<()> {
    let mut link = BytesStart::new("link");
    link.push_attribute(("href", href));
    writer.write_event(Event::Empty(link)).map_err(feed_err)?;
    Ok(())
}

fn entry(writer: &mut Writer<Vec<u8>>, program: &Program) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new("entry")))
        .map_err(feed_err)?;

    text_element(writer, "title", &program.title)?;
    link_element(writer, &program.link)?;
    text_element(writer, "id", &program.link)?;
    text_element(writer, "updated", &program.start_time.to_rfc3339())?;

    writer
        .write_event(Event::Start(BytesStart::new("author")))
        .map_err(feed_err)?;
    text_element(writer, "name", &program.channel_id.to_string())?;
    text_element(
        writer,
        "email",
        &format!("{}@example.com", program.channel_id),
    )?;
    writer
        .write_event(Event::End(BytesEnd::new("author")))
        .map_err(feed_err)?;

    text_element(
        writer,
        "summary",
        &format!(
            "{} - {} ({} min)",
            program.start_time.to_rfc3339(),
            program.end_time().to_rfc3339(),
            program.duration_minutes
        ),
    )?;

    writer
        .write_event(Event::End(BytesEnd::new("entry")))
        .map_err(feed_err)?;
    Ok(())
}

/// Renders an Atom document from the collected programs.
///
/// `site_link` is the guide site's base URL, used as the feed's own link
/// and id; `updated` is the crawl-start instant.
pub fn render_feed(
    config: &FeedConfig,
    site_link: &str,
    programs: &[Program],
    updated: DateTime<FixedOffset>,
) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(feed_err)?;

    let mut feed = BytesStart::new("feed");
    feed.push_attribute(("xmlns", ATOM_NS));
    writer.write_event(Event::Start(feed)).map_err(feed_err)?;

    text_element(&mut writer, "title", &config.title)?;
    text_element(&mut writer, "id", site_link)?;
    link_element(&mut writer, site_link)?;
    text_element(&mut writer, "updated", &updated.to_rfc3339())?;
    if !config.description.is_empty() {
        text_element(&mut writer, "subtitle", &config.description)?;
    }

    let cap = config.max_items.unwrap_or(programs.len());
    if cap < programs.len() {
        tracing::info!(
            total = programs.len(),
            kept = cap,
            "Truncating feed to first entries by discovery order"
        );
    }
    for program in programs.iter().take(cap) {
        entry(&mut writer, program)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("feed")))
        .map_err(feed_err)?;

    Ok(writer.into_inner())
}

/// Renders the feed and writes it to the configured path
pub fn write_feed(
    config: &FeedConfig,
    site_link: &str,
    programs: &[Program],
    updated: DateTime<FixedOffset>,
) -> Result<()> {
    let document = render_feed(config, site_link, programs, updated)?;
    std::fs::write(Path::new(&config.path), document)?;
    tracing::info!(path = %config.path, entries = programs.len().min(config.max_items.unwrap_or(usize::MAX)), "Feed written");
    Ok(())
}
